// Simulation driver: walks one price path day by day, computing realized
// vol, detecting decision points and roll triggers, resolving expiry,
// evaluating rules, executing signals, and folding events through the
// reducer. Generic over `Executor` rather than a trait object — the driver
// holds the executor by reference with no heap indirection (spec §9).

use crate::config::StrategyConfig;
use crate::executor::Executor;
use crate::reducer::apply_events;
use crate::rules::{evaluate_rules, Rule};
use crate::types::{
    initial_portfolio, DailyState, MarketSnapshot, Phase, PortfolioState, Signal, SignalLogEntry,
};

const TRADING_DAYS_PER_YEAR: f64 = 365.0;

/// Sample standard deviation of the `lookback` daily log returns ending at
/// `day`, annualized by `√365`. `None` when `day < lookback`.
pub fn compute_realized_vol(prices: &[f64], day: usize, lookback: usize) -> Option<f64> {
    if lookback == 0 || day < lookback {
        return None;
    }
    let start = day - lookback + 1;
    let returns: Vec<f64> = (start..=day).map(|i| (prices[i] / prices[i - 1]).ln()).collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0).max(1.0);
    Some(variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt())
}

pub struct SimulationResult {
    pub signal_log: Vec<SignalLogEntry>,
    pub daily_states: Vec<DailyState>,
    pub summary: PortfolioState,
}

pub fn simulate<E: Executor>(
    prices: &[f64],
    iv_path: Option<&[f64]>,
    rules: &[Rule],
    config: &StrategyConfig,
    executor: &E,
) -> SimulationResult {
    let mut portfolio = initial_portfolio();
    let mut signal_log = Vec::new();
    let mut daily_states = Vec::with_capacity(prices.len());

    let lookback = config.iv_rv_spread.map(|ivrv| ivrv.lookback_days as usize);

    for day in 0..prices.len() {
        let realized_vol = lookback.and_then(|lb| compute_realized_vol(prices, day, lb));
        let market = MarketSnapshot {
            day: day as u32,
            spot: prices[day],
            iv: iv_path.map(|p| p[day]),
            realized_vol,
        };

        let is_expired = portfolio.open_option.is_some_and(|o| market.day >= o.expiry_day);
        let no_open_option = portfolio.open_option.is_none();
        let decision_point = no_open_option || is_expired;

        let roll_trigger = config.roll_call.is_some_and(|rc| {
            portfolio.phase == Phase::ShortCall
                && portfolio
                    .open_option
                    .is_some_and(|o| market.spot >= o.strike * (1.0 + rc.itm_threshold_pct))
        });

        if decision_point || roll_trigger {
            if is_expired {
                let portfolio_before = portfolio;
                let events = executor.resolve_expiration(&market, &portfolio, config);
                portfolio = apply_events(&portfolio, &events);
                signal_log.push(SignalLogEntry {
                    day: market.day,
                    market,
                    portfolio_before,
                    signal: Signal::Hold,
                    events,
                    portfolio_after: portfolio,
                });
            }

            let portfolio_before_signal = portfolio;
            let signal = evaluate_rules(rules, &market, &portfolio, config);
            if !matches!(signal, Signal::Hold) {
                let events = executor.execute(&signal, &market, &portfolio, config);
                portfolio = apply_events(&portfolio, &events);
                signal_log.push(SignalLogEntry {
                    day: market.day,
                    market,
                    portfolio_before: portfolio_before_signal,
                    signal,
                    events,
                    portfolio_after: portfolio,
                });
            }
        }

        let unrealized_pl = portfolio
            .position
            .map_or(0.0, |p| (market.spot - p.entry_price) * p.size);
        daily_states.push(DailyState {
            day: market.day,
            price: market.spot,
            phase: portfolio.phase,
            cumulative_pl: portfolio.realized_pl,
            unrealized_pl,
            holding_eth: portfolio.position.is_some(),
        });
    }

    log::debug!(
        "simulate: {} days, {} signal-log entries, final phase {:?}",
        prices.len(),
        signal_log.len(),
        portfolio.phase
    );

    SimulationResult { signal_log, daily_states, summary: portfolio }
}
