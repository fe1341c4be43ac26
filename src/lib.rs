// Library exports for wheel-core: a deterministic, event-driven backtest
// engine for the cash-secured-put / covered-call wheel strategy.

pub mod config;
pub mod errors;
pub mod executor;
pub mod insights;
pub mod monte_carlo;
pub mod price_generator;
pub mod pricing;
pub mod prng;
pub mod reducer;
pub mod rules;
pub mod simulate;
pub mod types;

pub use config::{StrategyConfig, StrategyConfigInput};
pub use errors::{ConfigError, MarketInputError};
pub use executor::{Executor, SimulatedExecutor};
pub use insights::{generate_insights, Insight, InsightLevel};
pub use monte_carlo::{run_monte_carlo, rerun_single, MarketParams, MonteCarloResult, RerunOutcome, Regime, RunSummary};
pub use price_generator::{generate_prices, PriceModel, PricePath, PricePathConfig};
pub use simulate::{simulate, SimulationResult};
pub use types::{
    DailyState, Event, MarketSnapshot, OpenOption, OptionType, Phase, Position, PortfolioState,
    RuleId, Signal, SignalLogEntry,
};
