use wheel_core::config::{AdaptiveCalls, RollCall};
use wheel_core::{
    generate_prices, simulate, Event, OptionType, PriceModel, PricePathConfig, Signal,
    SimulatedExecutor, StrategyConfig, StrategyConfigInput,
};

fn scenario_config(adaptive: bool, roll_call: Option<RollCall>) -> StrategyConfig {
    StrategyConfig::new(StrategyConfigInput {
        target_delta: 0.30,
        implied_vol: 0.92,
        risk_free_rate: 0.05,
        cycle_length_days: 7,
        contracts: 1,
        bid_ask_spread_pct: 0.05,
        fee_per_trade: 0.50,
        adaptive_calls: if adaptive {
            Some(AdaptiveCalls {
                min_delta: 0.10,
                max_delta: 0.50,
                skip_threshold_pct: 0.001,
                min_strike_at_cost: None,
            })
        } else {
            None
        },
        iv_rv_spread: None,
        roll_call,
    })
    .unwrap()
}

#[test]
fn scenario_1_gbm_path_sells_a_put_and_tracks_skips() {
    let path = generate_prices(&PricePathConfig {
        start_price: 2500.0,
        days: 30,
        annual_drift: 0.0,
        annual_vol: 0.80,
        seed: 42,
        model: PriceModel::Gbm,
        heston: None,
        jump: None,
    })
    .unwrap();
    let config = scenario_config(true, None);
    let result = wheel_core::rules::rules_for_config(&config);
    let run = simulate(&path.prices, None, &result, &config, &SimulatedExecutor);

    let first_signal = run
        .signal_log
        .iter()
        .find(|e| !matches!(e.signal, Signal::Hold))
        .expect("expected a non-HOLD signal somewhere in a 30-day path");
    match first_signal.signal {
        Signal::SellPut { strike, premium, .. } => {
            assert!(strike < 2500.0);
            assert!(premium > 0.0);
        }
        other => panic!("expected the first non-HOLD signal to be SellPut, got {other:?}"),
    }

    assert!(run.summary.total_premium_collected > 0.0);

    let skip_event_count = run
        .signal_log
        .iter()
        .flat_map(|e| e.events.iter())
        .filter(|e| matches!(e, Event::CycleSkipped))
        .count() as u64;
    assert_eq!(skip_event_count, run.summary.total_skipped_cycles);
}

#[test]
fn scenario_2_flat_path_books_premium_once_at_sale_not_at_expiry() {
    let prices = vec![2500.0; 10];
    let config = scenario_config(false, None);
    let rules = wheel_core::rules::default_rules();
    let run = simulate(&prices, None, &rules, &config, &SimulatedExecutor);

    let sale = run
        .signal_log
        .iter()
        .find(|e| matches!(e.signal, Signal::SellPut { .. }))
        .expect("flat market should still sell an opening put");
    match sale.signal {
        Signal::SellPut { strike, .. } => assert!(strike < 2500.0),
        _ => unreachable!(),
    }
    let pl_after_sale = sale.portfolio_after.realized_pl;

    let expiry = run
        .signal_log
        .iter()
        .find(|e| {
            e.events
                .iter()
                .any(|ev| matches!(ev, Event::OptionExpired { assigned: false, .. }))
        })
        .expect("flat spot should expire the put OTM");
    assert_eq!(expiry.portfolio_after.realized_pl, pl_after_sale);
}

const WHEEL_SCENARIO_PRICES: [f64; 16] = [
    2500.0, 2400.0, 2300.0, 2200.0, 2150.0, 2100.0, 2100.0, 2100.0, 2200.0, 2500.0, 2600.0, 2700.0,
    2800.0, 2900.0, 3000.0, 3000.0,
];

#[test]
fn scenario_3_assignment_then_itm_call_rolls_mid_cycle() {
    let config = scenario_config(true, Some(RollCall { itm_threshold_pct: 0.05, require_net_credit: false }));
    let rules = wheel_core::rules::rules_for_config(&config);
    let run = simulate(&WHEEL_SCENARIO_PRICES, None, &rules, &config, &SimulatedExecutor);

    let put_assigned = run.signal_log.iter().any(|e| {
        e.events.iter().any(|ev| {
            matches!(ev, Event::OptionExpired { option_type: OptionType::Put, assigned: true, .. })
        })
    });
    assert!(put_assigned, "day-7 put should be assigned given this price path");

    let rolled = run
        .signal_log
        .iter()
        .any(|e| e.events.iter().any(|ev| matches!(ev, Event::OptionRolled { .. })));
    assert!(rolled, "expected a ROLL signal between days 8-13");
}

#[test]
fn scenario_4_require_net_credit_suppresses_every_roll() {
    let config = scenario_config(true, Some(RollCall { itm_threshold_pct: 0.05, require_net_credit: true }));
    let rules = wheel_core::rules::rules_for_config(&config);
    let run = simulate(&WHEEL_SCENARIO_PRICES, None, &rules, &config, &SimulatedExecutor);

    let rolled = run
        .signal_log
        .iter()
        .any(|e| e.events.iter().any(|ev| matches!(ev, Event::OptionRolled { .. })));
    assert!(!rolled, "a deep-ITM buy-back should always exceed a fresh OTM premium here");
}

#[test]
fn phase_and_position_invariant_holds_across_a_long_path() {
    let path = generate_prices(&PricePathConfig {
        start_price: 2500.0,
        days: 365,
        annual_drift: 0.02,
        annual_vol: 0.75,
        seed: 123,
        model: PriceModel::Heston,
        heston: Some(wheel_core::price_generator::HestonPathConfig {
            kappa: 2.0,
            xi: 0.3,
            rho: -0.7,
            theta: None,
            v0: None,
        }),
        jump: None,
    })
    .unwrap();
    let config = scenario_config(true, Some(RollCall { itm_threshold_pct: 0.05, require_net_credit: false }));
    let rules = wheel_core::rules::rules_for_config(&config);
    let run = simulate(&path.prices, path.iv_path.as_deref(), &rules, &config, &SimulatedExecutor);

    for state in &run.daily_states {
        let should_hold = matches!(
            state.phase,
            wheel_core::Phase::HoldingEth | wheel_core::Phase::ShortCall
        );
        assert_eq!(state.holding_eth, should_hold);
    }

    assert_eq!(run.daily_states.last().unwrap().cumulative_pl, run.summary.realized_pl);
}
