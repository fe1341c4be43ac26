// Core data model: phases, positions, open options, portfolio state,
// signals, events, and the per-day log entries the simulation driver
// produces. Signals and events are tagged-variant enums with payloads
// (spec §9's "tagged variants over inheritance"), not a class hierarchy —
// redesigned from the teacher's `SignalAction`/`Position` pair, which used
// a `dyn TradingStrategy` trait object and a mutable `Position` struct.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    IdleCash,
    ShortPut,
    HoldingEth,
    ShortCall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    Put,
    Call,
}

/// Present only while the wheel is holding the underlying.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub size: f64,
    pub entry_price: f64,
}

/// Present only while a short option is live.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenOption {
    pub option_type: OptionType,
    pub strike: f64,
    pub delta: f64,
    pub premium: f64,
    pub open_day: u32,
    pub expiry_day: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub phase: Phase,
    pub position: Option<Position>,
    pub open_option: Option<OpenOption>,
    pub realized_pl: f64,
    pub total_premium_collected: f64,
    pub total_assignments: u64,
    pub total_skipped_cycles: u64,
}

/// Fresh portfolio at the start of a simulation: idle cash, zeroed counters.
pub fn initial_portfolio() -> PortfolioState {
    PortfolioState {
        phase: Phase::IdleCash,
        position: None,
        open_option: None,
        realized_pl: 0.0,
        total_premium_collected: 0.0,
        total_assignments: 0,
        total_skipped_cycles: 0,
    }
}

/// Independent copy for logging — mutating the returned snapshot never
/// affects the live portfolio, since `PortfolioState` is `Copy`.
pub fn snapshot_portfolio(state: &PortfolioState) -> PortfolioState {
    *state
}

/// Read-only observation passed to rules and the executor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub day: u32,
    pub spot: f64,
    pub iv: Option<f64>,
    pub realized_vol: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RuleId {
    LowPremiumSkip,
    BasePut,
    AdaptiveCall,
    RollCall,
}

/// Strategy intent for one decision point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Signal {
    SellPut {
        strike: f64,
        delta: f64,
        premium: f64,
        rule: RuleId,
    },
    SellCall {
        strike: f64,
        delta: f64,
        premium: f64,
        rule: RuleId,
    },
    Skip {
        rule: RuleId,
    },
    ClosePosition {
        rule: RuleId,
    },
    Roll {
        new_strike: f64,
        new_delta: f64,
        roll_cost: f64,
        new_premium: f64,
        credit: f64,
        rule: RuleId,
    },
    Hold,
}

/// Execution fact produced by the executor and consumed by the reducer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Event {
    OptionSold {
        option_type: OptionType,
        strike: f64,
        delta: f64,
        premium: f64,
        open_day: u32,
        expiry_day: u32,
        fees: f64,
    },
    OptionExpired {
        option_type: OptionType,
        strike: f64,
        assigned: bool,
    },
    EthBought {
        price: f64,
        size: f64,
    },
    EthSold {
        price: f64,
        size: f64,
        pl: f64,
    },
    PremiumCollected {
        gross: f64,
        fees: f64,
        net: f64,
    },
    CycleSkipped,
    PositionClosed {
        price: f64,
        size: f64,
        pl: f64,
    },
    OptionRolled {
        old_strike: f64,
        new_strike: f64,
        new_delta: f64,
        original_premium: f64,
        roll_cost: f64,
        new_premium: f64,
        fees: f64,
        open_day: u32,
        expiry_day: u32,
    },
}

/// One day's signal evaluation, framed by independent before/after portfolio
/// snapshots. The log owns these entries exclusively; later mutation of the
/// live portfolio cannot reach back into history because the snapshots are
/// plain `Copy` values, not references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalLogEntry {
    pub day: u32,
    pub market: MarketSnapshot,
    pub portfolio_before: PortfolioState,
    pub signal: Signal,
    pub events: Vec<Event>,
    pub portfolio_after: PortfolioState,
}

/// One entry per simulated day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyState {
    pub day: u32,
    pub price: f64,
    pub phase: Phase,
    pub cumulative_pl: f64,
    pub unrealized_pl: f64,
    pub holding_eth: bool,
}
