// Criterion benchmarks for the wheel-core pricing and simulation engines.
//
// Run:   cargo bench
// HTML:  target/criterion/report/index.html

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::Duration;

use wheel_core::config::AdaptiveCalls;
use wheel_core::price_generator::HestonPathConfig;
use wheel_core::pricing::{bs_delta, bs_price, find_strike_for_delta, OptionKind};
use wheel_core::{
    generate_prices, rules, run_monte_carlo, simulate, MarketParams, PriceModel, PricePathConfig,
    SimulatedExecutor, StrategyConfig, StrategyConfigInput,
};

const SPOT: f64 = 2500.0;
const STRIKE: f64 = 2400.0;
const MATURITY: f64 = 7.0 / 365.0;
const RATE: f64 = 0.05;
const VOL: f64 = 0.80;

fn demo_config() -> StrategyConfig {
    StrategyConfig::new(StrategyConfigInput {
        target_delta: 0.30,
        implied_vol: VOL,
        risk_free_rate: RATE,
        cycle_length_days: 7,
        contracts: 1,
        bid_ask_spread_pct: 0.05,
        fee_per_trade: 0.50,
        adaptive_calls: Some(AdaptiveCalls {
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

// ── Black-Scholes pricing and inverse-delta strike solving ─────────────────
fn bench_bs_pricing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Black-Scholes pricing");
    group.sample_size(200);
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("put price + delta", |b| {
        b.iter(|| {
            black_box(bs_price(SPOT, STRIKE, MATURITY, RATE, VOL, OptionKind::Put));
            black_box(bs_delta(SPOT, STRIKE, MATURITY, RATE, VOL, OptionKind::Put));
        })
    });

    group.bench_function("strike solve for target delta", |b| {
        b.iter(|| {
            black_box(find_strike_for_delta(0.30, SPOT, MATURITY, RATE, VOL, OptionKind::Put))
        })
    });

    group.finish();
}

// ── Price-path generation across all four models ────────────────────────────
fn bench_price_path_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Price path generation (365 days)");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(8));

    let base = PricePathConfig {
        start_price: SPOT,
        days: 365,
        annual_drift: 0.05,
        annual_vol: VOL,
        seed: 42,
        model: PriceModel::Gbm,
        heston: None,
        jump: None,
    };

    group.bench_function("GBM", |b| {
        b.iter(|| black_box(generate_prices(&base).unwrap()))
    });

    let heston_cfg = PricePathConfig {
        model: PriceModel::Heston,
        heston: Some(HestonPathConfig { kappa: 2.0, xi: 0.3, rho: -0.7, theta: None, v0: None }),
        ..base.clone()
    };
    group.bench_function("Heston (QE scheme)", |b| {
        b.iter(|| black_box(generate_prices(&heston_cfg).unwrap()))
    });

    group.finish();
}

// ── Full single-path backtest ───────────────────────────────────────────────
fn bench_single_path_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Single-path simulation");
    group.sample_size(100);
    group.measurement_time(Duration::from_secs(8));

    let config = demo_config();
    let active_rules = rules::rules_for_config(&config);

    for &days in &[90usize, 365, 1000] {
        let path_config = PricePathConfig {
            start_price: SPOT,
            days,
            annual_drift: 0.05,
            annual_vol: VOL,
            seed: 7,
            model: PriceModel::Gbm,
            heston: None,
            jump: None,
        };
        let path = generate_prices(&path_config).unwrap();

        group.bench_with_input(BenchmarkId::new("days", days), &path, |b, path| {
            b.iter(|| {
                black_box(simulate(&path.prices, None, &active_rules, &config, &SimulatedExecutor))
            })
        });
    }

    group.finish();
}

// ── Monte Carlo batch, parallelized across seeds ────────────────────────────
fn bench_monte_carlo_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Monte Carlo batch (180 days)");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(10));

    let config = demo_config();
    let market_params = MarketParams {
        start_price: SPOT,
        days: 180,
        annual_vol: VOL,
        annual_drift: 0.05,
        model: Some(PriceModel::Gbm),
        heston: None,
        jump: None,
    };

    for &num_runs in &[50usize, 200] {
        group.bench_with_input(BenchmarkId::new("runs", num_runs), &num_runs, |b, &num_runs| {
            b.iter(|| black_box(run_monte_carlo(&market_params, &config, num_runs).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_bs_pricing,
    bench_price_path_generation,
    bench_single_path_simulation,
    bench_monte_carlo_batch,
);
criterion_main!(benches);
