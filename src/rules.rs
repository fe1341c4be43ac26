// Rule set as data, not a class hierarchy: a `Rule` is a record carrying a
// plain `fn` pointer, and `default_rules()` is an ordered `Vec`, not a
// registry of boxed trait objects. Redesigned from the teacher's
// `dyn TradingStrategy` (`strategies::mod::TradingStrategy`) per spec §9 —
// new rules are added by pushing into the list, not by implementing a trait.

use crate::config::StrategyConfig;
use crate::pricing::{bs_delta, bs_price, find_strike_for_delta, OptionKind};
use crate::types::{MarketSnapshot, Phase, PortfolioState, RuleId, Signal};

pub struct Rule {
    pub id: RuleId,
    pub name: &'static str,
    pub phase: Phase,
    pub priority: i32,
    pub evaluate: fn(&MarketSnapshot, &PortfolioState, &StrategyConfig) -> Option<Signal>,
}

impl Clone for Rule {
    fn clone(&self) -> Self {
        *self
    }
}
impl Copy for Rule {}

fn effective_vol(market: &MarketSnapshot, config: &StrategyConfig) -> f64 {
    market.iv.unwrap_or(config.implied_vol)
}

/// `1.0` when `iv_rv_spread` is absent or `realized_vol` is missing/≤0,
/// else `clamp(vol_eff / realized_vol, min_multiplier, max_multiplier)`.
fn iv_rv_multiplier(market: &MarketSnapshot, config: &StrategyConfig) -> f64 {
    let Some(ivrv) = config.iv_rv_spread else { return 1.0 };
    let Some(rv) = market.realized_vol else { return 1.0 };
    if rv <= 0.0 {
        return 1.0;
    }
    let vol_eff = effective_vol(market, config);
    (vol_eff / rv).clamp(ivrv.min_multiplier, ivrv.max_multiplier)
}

struct CallCandidate {
    strike: f64,
    delta: f64,
    premium: f64,
}

/// Shared by `AdaptiveCallRule` and `LowPremiumSkipRule`: both price the same
/// candidate covered call, including the `min_strike_at_cost` clamp.
fn compute_call_candidate(
    market: &MarketSnapshot,
    portfolio: &PortfolioState,
    config: &StrategyConfig,
) -> Option<CallCandidate> {
    let position = portfolio.position?;
    let vol_eff = effective_vol(market, config);
    let mult = iv_rv_multiplier(market, config);

    let base_delta = if let Some(ac) = config.adaptive_calls {
        let pnl_pct = (market.spot - position.entry_price) / position.entry_price;
        let t = ((pnl_pct + 1.0) / 2.0).clamp(0.0, 1.0);
        ac.min_delta + (ac.max_delta - ac.min_delta) * t
    } else {
        config.target_delta
    };
    let effective_delta = (base_delta * mult).min(0.50);
    let t_years = config.cycle_length_days as f64 / 365.0;

    let sol = find_strike_for_delta(
        effective_delta,
        market.spot,
        t_years,
        config.risk_free_rate,
        vol_eff,
        OptionKind::Call,
    )?;

    // For a clamped strike the reported delta reflects the clamped strike's
    // own effective delta, not the pre-clamp target (spec §9 open question).
    let (strike, delta) = match config.adaptive_calls {
        Some(ac) if ac.min_strike_at_cost == Some(true) && sol.strike < position.entry_price => {
            let clamped_strike = position.entry_price;
            let clamped_delta = bs_delta(
                market.spot,
                clamped_strike,
                t_years,
                config.risk_free_rate,
                vol_eff,
                OptionKind::Call,
            );
            (clamped_strike, clamped_delta)
        }
        _ => (sol.strike, sol.delta),
    };

    let raw_premium = bs_price(
        market.spot,
        strike,
        t_years,
        config.risk_free_rate,
        vol_eff,
        OptionKind::Call,
    );
    let premium = raw_premium * (1.0 - config.bid_ask_spread_pct);

    Some(CallCandidate { strike, delta, premium })
}

fn low_premium_skip_rule(
    market: &MarketSnapshot,
    portfolio: &PortfolioState,
    config: &StrategyConfig,
) -> Option<Signal> {
    if portfolio.phase != Phase::HoldingEth {
        return None;
    }
    let ac = config.adaptive_calls?;
    let position = portfolio.position?;
    let candidate = compute_call_candidate(market, portfolio, config)?;

    let net_premium = candidate.premium * config.contracts - config.fee_per_trade * config.contracts;
    let position_value = position.entry_price * config.contracts;

    if net_premium < ac.skip_threshold_pct * position_value {
        Some(Signal::Skip { rule: RuleId::LowPremiumSkip })
    } else {
        None
    }
}

fn base_put_rule(
    market: &MarketSnapshot,
    portfolio: &PortfolioState,
    config: &StrategyConfig,
) -> Option<Signal> {
    if portfolio.phase != Phase::IdleCash {
        return None;
    }
    let vol_eff = effective_vol(market, config);
    let mult = iv_rv_multiplier(market, config);
    let effective_delta = (config.target_delta * mult).min(0.50);
    let t = config.cycle_length_days as f64 / 365.0;

    let sol = find_strike_for_delta(
        effective_delta,
        market.spot,
        t,
        config.risk_free_rate,
        vol_eff,
        OptionKind::Put,
    )?;
    let raw_premium = bs_price(market.spot, sol.strike, t, config.risk_free_rate, vol_eff, OptionKind::Put);
    let premium = raw_premium * (1.0 - config.bid_ask_spread_pct);

    Some(Signal::SellPut {
        strike: sol.strike,
        delta: sol.delta,
        premium,
        rule: RuleId::BasePut,
    })
}

fn adaptive_call_rule(
    market: &MarketSnapshot,
    portfolio: &PortfolioState,
    config: &StrategyConfig,
) -> Option<Signal> {
    if portfolio.phase != Phase::HoldingEth {
        return None;
    }
    let candidate = compute_call_candidate(market, portfolio, config)?;
    Some(Signal::SellCall {
        strike: candidate.strike,
        delta: candidate.delta,
        premium: candidate.premium,
        rule: RuleId::AdaptiveCall,
    })
}

fn roll_call_rule(
    market: &MarketSnapshot,
    portfolio: &PortfolioState,
    config: &StrategyConfig,
) -> Option<Signal> {
    if portfolio.phase != Phase::ShortCall {
        return None;
    }
    let rc = config.roll_call?;
    let open = portfolio.open_option?;
    if market.spot < open.strike * (1.0 + rc.itm_threshold_pct) {
        return None;
    }

    let vol_eff = effective_vol(market, config);
    let mult = iv_rv_multiplier(market, config);
    let effective_delta = (config.target_delta * mult).min(0.50);
    let t = config.cycle_length_days as f64 / 365.0;

    let sol = find_strike_for_delta(
        effective_delta,
        market.spot,
        t,
        config.risk_free_rate,
        vol_eff,
        OptionKind::Call,
    )?;
    let raw_new_premium = bs_price(market.spot, sol.strike, t, config.risk_free_rate, vol_eff, OptionKind::Call);
    let new_premium = raw_new_premium * (1.0 - config.bid_ask_spread_pct);
    let roll_cost = bs_price(market.spot, open.strike, t, config.risk_free_rate, vol_eff, OptionKind::Call);

    if rc.require_net_credit && new_premium - roll_cost <= 0.0 {
        return None;
    }

    Some(Signal::Roll {
        new_strike: sol.strike,
        new_delta: sol.delta,
        roll_cost,
        new_premium,
        credit: new_premium - roll_cost,
        rule: RuleId::RollCall,
    })
}

pub const LOW_PREMIUM_SKIP_RULE: Rule = Rule {
    id: RuleId::LowPremiumSkip,
    name: "LowPremiumSkipRule",
    phase: Phase::HoldingEth,
    priority: 50,
    evaluate: low_premium_skip_rule,
};

pub const BASE_PUT_RULE: Rule = Rule {
    id: RuleId::BasePut,
    name: "BasePutRule",
    phase: Phase::IdleCash,
    priority: 100,
    evaluate: base_put_rule,
};

pub const ADAPTIVE_CALL_RULE: Rule = Rule {
    id: RuleId::AdaptiveCall,
    name: "AdaptiveCallRule",
    phase: Phase::HoldingEth,
    priority: 100,
    evaluate: adaptive_call_rule,
};

pub const ROLL_CALL_RULE: Rule = Rule {
    id: RuleId::RollCall,
    name: "RollCallRule",
    phase: Phase::ShortCall,
    priority: 30,
    evaluate: roll_call_rule,
};

/// `[LowPremiumSkipRule, BasePutRule, AdaptiveCallRule]`. Consumers may pass
/// a different list to [`evaluate_rules`].
pub fn default_rules() -> Vec<Rule> {
    vec![LOW_PREMIUM_SKIP_RULE, BASE_PUT_RULE, ADAPTIVE_CALL_RULE]
}

/// The default rules, plus `RollCallRule` when `config.roll_call` is wired.
pub fn rules_for_config(config: &StrategyConfig) -> Vec<Rule> {
    let mut rules = default_rules();
    if config.roll_call.is_some() {
        rules.push(ROLL_CALL_RULE);
    }
    rules
}

/// Sort a copy of `rules` by ascending priority (stable on ties), return the
/// first non-`None` signal, else `Signal::Hold`.
pub fn evaluate_rules(
    rules: &[Rule],
    market: &MarketSnapshot,
    portfolio: &PortfolioState,
    config: &StrategyConfig,
) -> Signal {
    let mut sorted = rules.to_vec();
    sorted.sort_by_key(|r| r.priority);
    for rule in &sorted {
        if let Some(signal) = (rule.evaluate)(market, portfolio, config) {
            return signal;
        }
    }
    Signal::Hold
}
