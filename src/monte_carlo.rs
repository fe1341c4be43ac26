// Monte Carlo driver: runs N independent seeded simulations and reduces
// them to a deterministic, order-independent aggregate. The per-seed loop
// is the one place this crate parallelizes (via rayon, mirroring
// `models::heston::HestonMonteCarlo::simulate_paths`'s `into_par_iter` fan
// out); aggregation itself is plain sequential arithmetic over a `Vec`
// collected in seed order, so a serial run over the same seeds produces the
// same `MonteCarloResult` bit for bit.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::StrategyConfig;
use crate::errors::MarketInputError;
use crate::executor::SimulatedExecutor;
use crate::price_generator::{generate_prices, HestonPathConfig, JumpPathConfig, PriceModel, PricePathConfig};
use crate::rules::rules_for_config;
use crate::simulate::simulate;
use crate::types::{Event, OptionType};

const TRADING_DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone)]
pub struct MarketParams {
    pub start_price: f64,
    pub days: usize,
    pub annual_vol: f64,
    pub annual_drift: f64,
    pub model: Option<PriceModel>,
    pub heston: Option<HestonPathConfig>,
    pub jump: Option<JumpPathConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    Bull,
    Bear,
    Sideways,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_pl: f64,
    pub apr: f64,
    pub max_drawdown: f64,
    pub full_cycles: u64,
    pub assignments: u64,
    pub skipped_cycles: u64,
    pub premium_collected: f64,
    pub benchmark_pl: f64,
    pub benchmark_apr: f64,
    pub benchmark_max_dd: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub benchmark_sharpe: f64,
    pub benchmark_sortino: f64,
    pub underlying_return: f64,
    pub regime: Regime,
}

fn max_drawdown(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let mut peak = series[0];
    let mut worst = 0.0_f64;
    for &v in series {
        peak = peak.max(v);
        worst = worst.max(peak - v);
    }
    worst
}

fn sharpe_like(returns: &[f64], r_f: f64, downside_only: bool) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let std = if downside_only {
        let sum_sq: f64 = returns.iter().filter(|&&r| r < r_f).map(|r| (r - r_f).powi(2)).sum();
        (sum_sq / (n - 1.0)).sqrt()
    } else {
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
        var.sqrt()
    };
    if std == 0.0 {
        0.0
    } else {
        (mean - r_f) / std * TRADING_DAYS_PER_YEAR.sqrt()
    }
}

fn classify_regime(underlying_return: f64, days: usize) -> Regime {
    let annualized = underlying_return * TRADING_DAYS_PER_YEAR / (days.saturating_sub(1).max(1) as f64);
    if annualized > 0.20 {
        Regime::Bull
    } else if annualized < -0.20 {
        Regime::Bear
    } else {
        Regime::Sideways
    }
}

fn summarize_run(
    prices: &[f64],
    result: &crate::simulate::SimulationResult,
    config: &StrategyConfig,
) -> RunSummary {
    let capital_at_risk = prices[0] * config.contracts;
    let years_elapsed = prices.len() as f64 / TRADING_DAYS_PER_YEAR;
    let r_f_daily = config.risk_free_rate / TRADING_DAYS_PER_YEAR;

    let last = result.daily_states.last().expect("simulate always produces one DailyState per day");
    let total_pl = last.cumulative_pl + last.unrealized_pl;
    let apr = if capital_at_risk != 0.0 && years_elapsed > 0.0 {
        (result.summary.realized_pl / capital_at_risk) / years_elapsed * 100.0
    } else {
        0.0
    };

    let equity_curve: Vec<f64> = result.daily_states.iter().map(|d| d.cumulative_pl + d.unrealized_pl).collect();
    let strategy_returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| (w[1] - w[0]) / capital_at_risk)
        .collect();

    let full_cycles = result
        .signal_log
        .iter()
        .filter(|entry| {
            entry.events.iter().any(|ev| {
                matches!(ev, Event::OptionExpired { option_type: OptionType::Call, assigned: true, .. })
            })
        })
        .count() as u64;

    let price_first = prices[0];
    let price_last = *prices.last().unwrap();
    let benchmark_pl = (price_last - price_first) * config.contracts;
    let benchmark_apr = if capital_at_risk != 0.0 && years_elapsed > 0.0 {
        (benchmark_pl / capital_at_risk) / years_elapsed * 100.0
    } else {
        0.0
    };
    let benchmark_curve: Vec<f64> = prices.iter().map(|p| (p - price_first) * config.contracts).collect();
    let benchmark_returns: Vec<f64> = prices.windows(2).map(|w| (w[1] - w[0]) / price_first).collect();

    let underlying_return = (price_last - price_first) / price_first;

    RunSummary {
        total_pl,
        apr,
        max_drawdown: max_drawdown(&equity_curve),
        full_cycles,
        assignments: result.summary.total_assignments,
        skipped_cycles: result.summary.total_skipped_cycles,
        premium_collected: result.summary.total_premium_collected,
        benchmark_pl,
        benchmark_apr,
        benchmark_max_dd: max_drawdown(&benchmark_curve),
        sharpe: sharpe_like(&strategy_returns, r_f_daily, false),
        sortino: sharpe_like(&strategy_returns, r_f_daily, true),
        benchmark_sharpe: sharpe_like(&benchmark_returns, r_f_daily, false),
        benchmark_sortino: sharpe_like(&benchmark_returns, r_f_daily, true),
        underlying_return,
        regime: classify_regime(underlying_return, prices.len()),
    }
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    percentile_of_sorted(sorted, 0.5)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegimeStats {
    pub regime: Regime,
    pub count: usize,
    pub mean_apr: f64,
    pub mean_benchmark_apr: f64,
    pub mean_alpha: f64,
    pub mean_sharpe: f64,
    pub win_rate: f64,
    pub mean_max_drawdown: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub num_runs: usize,
    pub winner_rate: f64,
    pub mean_apr: f64,
    pub median_apr: f64,
    pub p5_apr: f64,
    pub p25_apr: f64,
    pub p75_apr: f64,
    pub p95_apr: f64,
    pub mean_pl: f64,
    pub median_pl: f64,
    pub mean_max_drawdown: f64,
    pub mean_benchmark_apr: f64,
    pub median_benchmark_apr: f64,
    pub mean_benchmark_pl: f64,
    pub mean_benchmark_max_dd: f64,
    pub mean_sharpe: f64,
    pub mean_sortino: f64,
    pub mean_benchmark_sharpe: f64,
    pub mean_benchmark_sortino: f64,
    pub mean_full_cycles: f64,
    pub mean_assignments: f64,
    pub regime_breakdown: Vec<RegimeStats>,
}

fn regime_stats_for(regime: Regime, runs: &[RunSummary]) -> RegimeStats {
    let in_regime: Vec<&RunSummary> = runs.iter().filter(|r| r.regime == regime).collect();
    let count = in_regime.len();
    if count == 0 {
        return RegimeStats {
            regime,
            count: 0,
            mean_apr: 0.0,
            mean_benchmark_apr: 0.0,
            mean_alpha: 0.0,
            mean_sharpe: 0.0,
            win_rate: 0.0,
            mean_max_drawdown: 0.0,
        };
    }
    let aprs: Vec<f64> = in_regime.iter().map(|r| r.apr).collect();
    let bench_aprs: Vec<f64> = in_regime.iter().map(|r| r.benchmark_apr).collect();
    let alphas: Vec<f64> = in_regime.iter().map(|r| r.apr - r.benchmark_apr).collect();
    let sharpes: Vec<f64> = in_regime.iter().map(|r| r.sharpe).collect();
    let drawdowns: Vec<f64> = in_regime.iter().map(|r| r.max_drawdown).collect();
    let wins = in_regime.iter().filter(|r| r.total_pl > 0.0).count();

    RegimeStats {
        regime,
        count,
        mean_apr: mean(&aprs),
        mean_benchmark_apr: mean(&bench_aprs),
        mean_alpha: mean(&alphas),
        mean_sharpe: mean(&sharpes),
        win_rate: wins as f64 / count as f64,
        mean_max_drawdown: mean(&drawdowns),
    }
}

fn aggregate(runs: &[RunSummary]) -> MonteCarloResult {
    let num_runs = runs.len();
    let aprs: Vec<f64> = runs.iter().map(|r| r.apr).collect();
    let mut aprs_sorted = aprs.clone();
    aprs_sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let pls: Vec<f64> = runs.iter().map(|r| r.total_pl).collect();
    let mut pls_sorted = pls.clone();
    pls_sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let bench_aprs: Vec<f64> = runs.iter().map(|r| r.benchmark_apr).collect();
    let mut bench_aprs_sorted = bench_aprs.clone();
    bench_aprs_sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let drawdowns: Vec<f64> = runs.iter().map(|r| r.max_drawdown).collect();
    let bench_pls: Vec<f64> = runs.iter().map(|r| r.benchmark_pl).collect();
    let bench_dds: Vec<f64> = runs.iter().map(|r| r.benchmark_max_dd).collect();
    let sharpes: Vec<f64> = runs.iter().map(|r| r.sharpe).collect();
    let sortinos: Vec<f64> = runs.iter().map(|r| r.sortino).collect();
    let bench_sharpes: Vec<f64> = runs.iter().map(|r| r.benchmark_sharpe).collect();
    let bench_sortinos: Vec<f64> = runs.iter().map(|r| r.benchmark_sortino).collect();
    let full_cycles: Vec<f64> = runs.iter().map(|r| r.full_cycles as f64).collect();
    let assignments: Vec<f64> = runs.iter().map(|r| r.assignments as f64).collect();

    let winners = runs.iter().filter(|r| r.total_pl > 0.0).count();

    MonteCarloResult {
        num_runs,
        winner_rate: if num_runs == 0 { 0.0 } else { winners as f64 / num_runs as f64 },
        mean_apr: mean(&aprs),
        median_apr: median_of_sorted(&aprs_sorted),
        p5_apr: percentile_of_sorted(&aprs_sorted, 0.05),
        p25_apr: percentile_of_sorted(&aprs_sorted, 0.25),
        p75_apr: percentile_of_sorted(&aprs_sorted, 0.75),
        p95_apr: percentile_of_sorted(&aprs_sorted, 0.95),
        mean_pl: mean(&pls),
        median_pl: median_of_sorted(&pls_sorted),
        mean_max_drawdown: mean(&drawdowns),
        mean_benchmark_apr: mean(&bench_aprs),
        median_benchmark_apr: median_of_sorted(&bench_aprs_sorted),
        mean_benchmark_pl: mean(&bench_pls),
        mean_benchmark_max_dd: mean(&bench_dds),
        mean_sharpe: mean(&sharpes),
        mean_sortino: mean(&sortinos),
        mean_benchmark_sharpe: mean(&bench_sharpes),
        mean_benchmark_sortino: mean(&bench_sortinos),
        mean_full_cycles: mean(&full_cycles),
        mean_assignments: mean(&assignments),
        regime_breakdown: vec![
            regime_stats_for(Regime::Bull, runs),
            regime_stats_for(Regime::Bear, runs),
            regime_stats_for(Regime::Sideways, runs),
        ],
    }
}

fn path_config_for_seed(market_params: &MarketParams, seed: u64) -> PricePathConfig {
    PricePathConfig {
        start_price: market_params.start_price,
        days: market_params.days,
        annual_drift: market_params.annual_drift,
        annual_vol: market_params.annual_vol,
        seed,
        model: market_params.model.unwrap_or(PriceModel::Gbm),
        heston: market_params.heston,
        jump: market_params.jump,
    }
}

/// Run `num_runs` independent seeded simulations (seeds `1..=num_runs`) and
/// reduce them to a deterministic aggregate. Per-seed work may run on any
/// number of rayon threads; the result does not depend on how work was
/// scheduled.
pub fn run_monte_carlo(
    market_params: &MarketParams,
    config: &StrategyConfig,
    num_runs: usize,
) -> Result<MonteCarloResult, MarketInputError> {
    if num_runs == 0 {
        return Err(MarketInputError::NonPositiveNumRuns(num_runs));
    }
    if market_params.days < 1 {
        return Err(MarketInputError::TooFewDays(market_params.days));
    }
    if !(market_params.start_price > 0.0) {
        return Err(MarketInputError::NonPositiveStartPrice(market_params.start_price));
    }

    let rules = rules_for_config(config);

    let runs: Vec<RunSummary> = (1..=num_runs as u64)
        .into_par_iter()
        .map(|seed| -> Result<RunSummary, MarketInputError> {
            let path = generate_prices(&path_config_for_seed(market_params, seed))?;
            let result = simulate(&path.prices, path.iv_path.as_deref(), &rules, config, &SimulatedExecutor);
            Ok(summarize_run(&path.prices, &result, config))
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::info!("run_monte_carlo: {num_runs} runs, winner_rate to follow in aggregate");
    Ok(aggregate(&runs))
}

pub struct RerunOutcome {
    pub prices: Vec<f64>,
    pub result: crate::simulate::SimulationResult,
}

/// Replay a single seed's full path and signal log, for drill-down UIs that
/// want the detail behind one Monte Carlo run.
pub fn rerun_single(
    market_params: &MarketParams,
    config: &StrategyConfig,
    seed: u64,
) -> Result<RerunOutcome, MarketInputError> {
    if market_params.days < 1 {
        return Err(MarketInputError::TooFewDays(market_params.days));
    }
    if !(market_params.start_price > 0.0) {
        return Err(MarketInputError::NonPositiveStartPrice(market_params.start_price));
    }

    let rules = rules_for_config(config);
    let path = generate_prices(&path_config_for_seed(market_params, seed))?;
    let result = simulate(&path.prices, path.iv_path.as_deref(), &rules, config, &SimulatedExecutor);
    Ok(RerunOutcome { prices: path.prices, result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyConfigInput;

    fn config() -> StrategyConfig {
        StrategyConfig::new(StrategyConfigInput {
            target_delta: 0.30,
            implied_vol: 0.92,
            risk_free_rate: 0.05,
            cycle_length_days: 7,
            contracts: 1,
            bid_ask_spread_pct: 0.05,
            fee_per_trade: 0.50,
            adaptive_calls: Some(crate::config::AdaptiveCalls {
                min_delta: 0.10,
                max_delta: 0.50,
                skip_threshold_pct: 0.001,
                min_strike_at_cost: None,
            }),
            iv_rv_spread: None,
            roll_call: None,
        })
        .unwrap()
    }

    fn market_params() -> MarketParams {
        MarketParams {
            start_price: 2500.0,
            days: 30,
            annual_vol: 0.8,
            annual_drift: 0.0,
            model: None,
            heston: None,
            jump: None,
        }
    }

    #[test]
    fn scenario_5_regime_breakdown_covers_all_three_regimes() {
        let result = run_monte_carlo(&market_params(), &config(), 50).unwrap();
        let total: usize = result.regime_breakdown.iter().map(|r| r.count).sum();
        assert_eq!(total, 50);
        assert_eq!(result.regime_breakdown.len(), 3);
        assert!(result.mean_sharpe.is_finite());
        assert!(result.mean_sortino.is_finite());
    }

    #[test]
    fn run_monte_carlo_is_deterministic() {
        let a = run_monte_carlo(&market_params(), &config(), 20).unwrap();
        let b = run_monte_carlo(&market_params(), &config(), 20).unwrap();
        assert_eq!(a.mean_apr, b.mean_apr);
        assert_eq!(a.mean_pl, b.mean_pl);
        assert_eq!(a.winner_rate, b.winner_rate);
        for (ra, rb) in a.regime_breakdown.iter().zip(b.regime_breakdown.iter()) {
            assert_eq!(ra.count, rb.count);
            assert_eq!(ra.mean_apr, rb.mean_apr);
        }
    }

    #[test]
    fn rejects_zero_num_runs() {
        assert_eq!(
            run_monte_carlo(&market_params(), &config(), 0).unwrap_err(),
            MarketInputError::NonPositiveNumRuns(0)
        );
    }

    #[test]
    fn rerun_single_reproduces_the_matching_seed_in_a_batch() {
        let rerun = rerun_single(&market_params(), &config(), 7).unwrap();
        assert_eq!(rerun.prices.len(), 30);
        assert!(!rerun.result.daily_states.is_empty());
    }

    #[test]
    fn regime_boundary_20_percent_is_sideways_not_bull() {
        // underlying_return * 365/(days-1) == 0.20 exactly at the boundary.
        let days = 30usize;
        let underlying_return = 0.20 * (days - 1) as f64 / TRADING_DAYS_PER_YEAR;
        assert_eq!(classify_regime(underlying_return, days), Regime::Sideways);
        assert_eq!(classify_regime(underlying_return + 1e-6, days), Regime::Bull);
    }
}
