// Executor contract: two pure operations translating market/portfolio state
// plus a signal (or an expired option) into a deterministic event sequence.
// Kept as a trait with exactly two methods and no heap indirection at the
// call site (spec §9: "the executor is a trait/interface... the simulation
// driver holds the executor by reference"), unlike the data-driven rule set.
// Grounded on `backtesting::trade::Trade`'s value/cost/proceeds accounting
// and `backtesting::position::Position`'s assignment bookkeeping.

use crate::config::StrategyConfig;
use crate::types::{Event, MarketSnapshot, OptionType, PortfolioState, Signal};

pub trait Executor {
    fn resolve_expiration(
        &self,
        market: &MarketSnapshot,
        portfolio: &PortfolioState,
        config: &StrategyConfig,
    ) -> Vec<Event>;

    fn execute(
        &self,
        signal: &Signal,
        market: &MarketSnapshot,
        portfolio: &PortfolioState,
        config: &StrategyConfig,
    ) -> Vec<Event>;
}

pub struct SimulatedExecutor;

impl Executor for SimulatedExecutor {
    fn resolve_expiration(
        &self,
        market: &MarketSnapshot,
        portfolio: &PortfolioState,
        config: &StrategyConfig,
    ) -> Vec<Event> {
        let Some(open) = portfolio.open_option else { return Vec::new() };

        let assigned = match open.option_type {
            OptionType::Put => market.spot < open.strike,
            OptionType::Call => market.spot >= open.strike,
        };

        let mut events = vec![Event::OptionExpired {
            option_type: open.option_type,
            strike: open.strike,
            assigned,
        }];

        if assigned {
            match open.option_type {
                OptionType::Put => {
                    events.push(Event::EthBought { price: open.strike, size: config.contracts });
                }
                OptionType::Call => {
                    let entry_price = portfolio.position.map(|p| p.entry_price).unwrap_or(open.strike);
                    let pl = (open.strike - entry_price) * config.contracts;
                    events.push(Event::EthSold { price: open.strike, size: config.contracts, pl });
                }
            }
        }

        events
    }

    fn execute(
        &self,
        signal: &Signal,
        market: &MarketSnapshot,
        portfolio: &PortfolioState,
        config: &StrategyConfig,
    ) -> Vec<Event> {
        match *signal {
            Signal::SellPut { strike, delta, premium, .. } => {
                sell_option(OptionType::Put, strike, delta, premium, market.day, config)
            }
            Signal::SellCall { strike, delta, premium, .. } => {
                sell_option(OptionType::Call, strike, delta, premium, market.day, config)
            }
            Signal::Skip { .. } => vec![Event::CycleSkipped],
            Signal::ClosePosition { .. } => {
                let Some(position) = portfolio.position else { return Vec::new() };
                let pl = (market.spot - position.entry_price) * position.size;
                vec![Event::PositionClosed { price: market.spot, size: position.size, pl }]
            }
            Signal::Roll { new_strike, new_delta, roll_cost, new_premium, .. } => {
                let Some(open) = portfolio.open_option else { return Vec::new() };
                let fees = 2.0 * config.fee_per_trade * config.contracts;
                vec![Event::OptionRolled {
                    old_strike: open.strike,
                    new_strike,
                    new_delta,
                    original_premium: open.premium,
                    roll_cost,
                    new_premium,
                    fees,
                    open_day: market.day,
                    expiry_day: market.day + config.cycle_length_days,
                }]
            }
            Signal::Hold => Vec::new(),
        }
    }
}

fn sell_option(
    option_type: OptionType,
    strike: f64,
    delta: f64,
    premium: f64,
    day: u32,
    config: &StrategyConfig,
) -> Vec<Event> {
    let fees = config.fee_per_trade * config.contracts;
    let gross = premium * config.contracts;
    vec![
        Event::OptionSold {
            option_type,
            strike,
            delta,
            premium,
            open_day: day,
            expiry_day: day + config.cycle_length_days,
            fees,
        },
        Event::PremiumCollected { gross, fees, net: gross - fees },
    ]
}
