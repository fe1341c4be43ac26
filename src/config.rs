// Strategy configuration, validated at construction per the error-handling
// design: rule code and the simulation driver may assume a `StrategyConfig`
// is already valid. Mirrors the teacher's `StocksConfig::load_from_file`
// gate-at-the-boundary pattern, promoted to a typed `ConfigError` (see
// SPEC_FULL.md §10.2 for why a typed enum replaces the teacher's
// `Result<(), String>` convention here).

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveCalls {
    pub min_delta: f64,
    pub max_delta: f64,
    pub skip_threshold_pct: f64,
    pub min_strike_at_cost: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IvRvSpread {
    pub lookback_days: u32,
    pub min_multiplier: f64,
    pub max_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollCall {
    pub itm_threshold_pct: f64,
    pub require_net_credit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub target_delta: f64,
    pub implied_vol: f64,
    pub risk_free_rate: f64,
    pub cycle_length_days: u32,
    pub contracts: f64,
    pub bid_ask_spread_pct: f64,
    pub fee_per_trade: f64,
    pub adaptive_calls: Option<AdaptiveCalls>,
    pub iv_rv_spread: Option<IvRvSpread>,
    pub roll_call: Option<RollCall>,
}

/// Raw, unvalidated fields — the only way to build a [`StrategyConfig`] is
/// through [`StrategyConfig::new`], which rejects anything in this struct
/// that violates §7's invalid-configuration list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfigInput {
    pub target_delta: f64,
    pub implied_vol: f64,
    pub risk_free_rate: f64,
    pub cycle_length_days: i64,
    pub contracts: i64,
    pub bid_ask_spread_pct: f64,
    pub fee_per_trade: f64,
    pub adaptive_calls: Option<AdaptiveCalls>,
    pub iv_rv_spread: Option<IvRvSpread>,
    pub roll_call: Option<RollCall>,
}

impl StrategyConfig {
    pub fn new(input: StrategyConfigInput) -> Result<Self, ConfigError> {
        if input.contracts <= 0 {
            return Err(ConfigError::NonPositiveContracts(input.contracts));
        }
        if input.cycle_length_days <= 0 {
            return Err(ConfigError::NonPositiveCycleLength(input.cycle_length_days));
        }
        if !(input.bid_ask_spread_pct >= 0.0 && input.bid_ask_spread_pct < 1.0) {
            return Err(ConfigError::InvalidBidAskSpread(input.bid_ask_spread_pct));
        }
        if input.fee_per_trade < 0.0 {
            return Err(ConfigError::NegativeFee(input.fee_per_trade));
        }
        if !(input.target_delta > 0.0 && input.target_delta <= 0.50) {
            return Err(ConfigError::InvalidTargetDelta(input.target_delta));
        }
        if input.implied_vol <= 0.0 {
            return Err(ConfigError::NonPositiveImpliedVol(input.implied_vol));
        }
        if let Some(ac) = input.adaptive_calls {
            if ac.min_delta > ac.max_delta {
                return Err(ConfigError::AdaptiveCallsDeltaOrder {
                    min: ac.min_delta,
                    max: ac.max_delta,
                });
            }
            if ac.skip_threshold_pct < 0.0 {
                return Err(ConfigError::NegativeSkipThreshold(ac.skip_threshold_pct));
            }
        }
        if let Some(ivrv) = input.iv_rv_spread {
            if ivrv.min_multiplier > ivrv.max_multiplier {
                return Err(ConfigError::IvRvMultiplierOrder {
                    min: ivrv.min_multiplier,
                    max: ivrv.max_multiplier,
                });
            }
            if ivrv.lookback_days == 0 {
                return Err(ConfigError::NonPositiveLookback(0));
            }
        }
        if let Some(rc) = input.roll_call {
            if rc.itm_threshold_pct < 0.0 {
                return Err(ConfigError::NegativeItmThreshold(rc.itm_threshold_pct));
            }
        }

        Ok(StrategyConfig {
            target_delta: input.target_delta,
            implied_vol: input.implied_vol,
            risk_free_rate: input.risk_free_rate,
            cycle_length_days: input.cycle_length_days as u32,
            contracts: input.contracts as f64,
            bid_ask_spread_pct: input.bid_ask_spread_pct,
            fee_per_trade: input.fee_per_trade,
            adaptive_calls: input.adaptive_calls,
            iv_rv_spread: input.iv_rv_spread,
            roll_call: input.roll_call,
        })
    }
}
