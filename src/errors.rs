// Typed errors for the two input-validation boundaries named in the error
// handling design: config construction and market-input validation. Every
// other layer (rules, executor, reducer, simulation driver) is total and
// never returns `Result` — see `reducer`, `rules`, `executor`, `simulate`.

use thiserror::Error;

/// Rejected `StrategyConfig` construction. Each variant names one of the
/// "Invalid configuration" bullets.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("contracts must be positive, got {0}")]
    NonPositiveContracts(i64),

    #[error("cycle_length_days must be positive, got {0}")]
    NonPositiveCycleLength(i64),

    #[error("bid_ask_spread_pct must be in [0, 1), got {0}")]
    InvalidBidAskSpread(f64),

    #[error("fee_per_trade must be non-negative, got {0}")]
    NegativeFee(f64),

    #[error("target_delta must be in (0, 0.5], got {0}")]
    InvalidTargetDelta(f64),

    #[error("implied_vol must be positive, got {0}")]
    NonPositiveImpliedVol(f64),

    #[error("adaptive_calls.min_delta ({min}) must be <= max_delta ({max})")]
    AdaptiveCallsDeltaOrder { min: f64, max: f64 },

    #[error("adaptive_calls.skip_threshold_pct must be non-negative, got {0}")]
    NegativeSkipThreshold(f64),

    #[error("iv_rv_spread.min_multiplier ({min}) must be <= max_multiplier ({max})")]
    IvRvMultiplierOrder { min: f64, max: f64 },

    #[error("iv_rv_spread.lookback_days must be positive, got {0}")]
    NonPositiveLookback(i64),

    #[error("roll_call.itm_threshold_pct must be non-negative, got {0}")]
    NegativeItmThreshold(f64),
}

/// Rejected market input (price path request or an already-built path handed
/// to the Monte Carlo / simulation entry points).
#[derive(Debug, Error, PartialEq)]
pub enum MarketInputError {
    #[error("days must be >= 1, got {0}")]
    TooFewDays(usize),

    #[error("start_price must be positive, got {0}")]
    NonPositiveStartPrice(f64),

    #[error("num_runs must be >= 1, got {0}")]
    NonPositiveNumRuns(usize),
}
