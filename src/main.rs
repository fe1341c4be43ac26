// Demo entry point for wheel-core: a single-path backtest followed by a
// small Monte Carlo batch and the insights generated from it.

use std::time::Instant;

use wheel_core::{
    generate_insights, generate_prices, run_monte_carlo, simulate, MarketParams, PriceModel,
    PricePathConfig, Signal, SimulatedExecutor, StrategyConfig, StrategyConfigInput,
};

fn demo_config() -> StrategyConfig {
    StrategyConfig::new(StrategyConfigInput {
        target_delta: 0.30,
        implied_vol: 0.65,
        risk_free_rate: 0.05,
        cycle_length_days: 7,
        contracts: 1,
        bid_ask_spread_pct: 0.05,
        fee_per_trade: 0.50,
        adaptive_calls: Some(wheel_core::config::AdaptiveCalls {
            min_delta: 0.10,
            max_delta: 0.50,
            skip_threshold_pct: 0.001,
            min_strike_at_cost: None,
        }),
        iv_rv_spread: None,
        roll_call: Some(wheel_core::config::RollCall {
            itm_threshold_pct: 0.05,
            require_net_credit: false,
        }),
    })
    .expect("demo config satisfies every invalid-configuration check")
}

fn main() {
    env_logger::init();

    println!("{}", "=".repeat(70));
    println!("    WHEEL STRATEGY BACKTEST ENGINE");
    println!("{}", "=".repeat(70));

    let config = demo_config();

    println!("\n{}", "-".repeat(70));
    println!("SINGLE-PATH BACKTEST (GBM, seed 42, 180 days)");
    println!("{}", "-".repeat(70));

    let start = Instant::now();
    let path = generate_prices(&PricePathConfig {
        start_price: 2500.0,
        days: 180,
        annual_drift: 0.05,
        annual_vol: 0.70,
        seed: 42,
        model: PriceModel::Gbm,
        heston: None,
        jump: None,
    })
    .expect("days >= 1 and start_price > 0");
    let generation_time = start.elapsed();

    let rules = wheel_core::rules::rules_for_config(&config);
    let sim_start = Instant::now();
    let result = simulate(&path.prices, path.iv_path.as_deref(), &rules, &config, &SimulatedExecutor);
    let sim_time = sim_start.elapsed();

    println!("Price path generated in {:.3} ms", generation_time.as_secs_f64() * 1000.0);
    println!("Simulation ran in {:.3} ms", sim_time.as_secs_f64() * 1000.0);
    println!("Signal-log entries: {}", result.signal_log.len());
    println!("Total premium collected: ${:.2}", result.summary.total_premium_collected);
    println!("Total assignments: {}", result.summary.total_assignments);
    println!("Total skipped cycles: {}", result.summary.total_skipped_cycles);
    println!("Realized P/L: ${:.2}", result.summary.realized_pl);

    println!("\nFirst five non-HOLD signals:");
    for entry in result.signal_log.iter().filter(|e| !matches!(e.signal, Signal::Hold)).take(5) {
        println!("  day {:>4}  {:?}", entry.day, entry.signal);
    }

    println!("\n{}", "-".repeat(70));
    println!("MONTE CARLO BATCH (200 seeds, GBM, 180 days)");
    println!("{}", "-".repeat(70));

    let market_params = MarketParams {
        start_price: 2500.0,
        days: 180,
        annual_vol: 0.70,
        annual_drift: 0.05,
        model: Some(PriceModel::Gbm),
        heston: None,
        jump: None,
    };

    let mc_start = Instant::now();
    let mc_result = run_monte_carlo(&market_params, &config, 200).expect("valid market params and config");
    let mc_time = mc_start.elapsed();

    println!("Monte Carlo batch ran in {:.3} ms", mc_time.as_secs_f64() * 1000.0);
    println!("Winner rate: {:.1}%", mc_result.winner_rate * 100.0);
    println!("Mean APR: {:.2}% (benchmark {:.2}%)", mc_result.mean_apr, mc_result.mean_benchmark_apr);
    println!("Mean Sharpe: {:.2} (benchmark {:.2})", mc_result.mean_sharpe, mc_result.mean_benchmark_sharpe);
    println!("Mean Sortino: {:.2} (benchmark {:.2})", mc_result.mean_sortino, mc_result.mean_benchmark_sortino);

    println!("\nRegime breakdown:");
    for regime in &mc_result.regime_breakdown {
        println!(
            "  {:?}: {} runs, mean APR {:.2}%, mean alpha {:.2}, win rate {:.1}%",
            regime.regime,
            regime.count,
            regime.mean_apr,
            regime.mean_alpha,
            regime.win_rate * 100.0
        );
    }

    println!("\n{}", "-".repeat(70));
    println!("INSIGHTS");
    println!("{}", "-".repeat(70));

    for insight in generate_insights(&mc_result, &config) {
        println!("[{:?}] {}: {}", insight.level, insight.title, insight.message);
        if let Some(suggestion) = &insight.suggestion {
            println!("    suggestion: {suggestion}");
        }
    }

    println!("\n{}", "=".repeat(70));
}
