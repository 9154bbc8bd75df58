//! Application configuration loaded from environment variables or a JSON file.
//!
//! Every value is optional and falls back to a default:
//! - `COINBOOK_FEED_CAPACITY`: bounded capacity of each depth delta channel
//! - `COINBOOK_MARKET_BUY_CEILING`: limit rate synthesized for market buys
//! - `COINBOOK_MARKET_SELL_FLOOR`: limit rate synthesized for market sells

use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::CoinbookError;

/// Default number of deltas buffered per aggregator before the oldest are dropped.
pub const DEFAULT_FEED_CAPACITY: usize = 1024;

/// Largest accepted feed capacity. Channel slots are allocated up front.
pub const MAX_FEED_CAPACITY: usize = 1 << 16;

/// Default market-buy limit: 10^15 units of the pricing currency per item.
pub const DEFAULT_MARKET_BUY_CEILING: Decimal = Decimal::from_parts(2764472320, 232830, 0, false, 0);

/// Default market-sell limit: 10^-15 units of the pricing currency per item.
pub const DEFAULT_MARKET_SELL_FLOOR: Decimal = Decimal::from_parts(1, 0, 0, false, 15);

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub feed: FeedConfig,
    pub simulation: SimulationConfig,
}

/// Settings for the streaming depth feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub capacity: usize,
}

/// Settings for the order-book simulator.
///
/// Market orders are simulated as limit orders at these extremes so that
/// the limit check applies uniformly to every order kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub market_buy_ceiling: Decimal,
    pub market_sell_floor: Decimal,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_FEED_CAPACITY,
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            market_buy_ceiling: DEFAULT_MARKET_BUY_CEILING,
            market_sell_floor: DEFAULT_MARKET_SELL_FLOOR,
        }
    }
}

impl AppConfig {
    /// Builds a configuration from a variable lookup, applying defaults for
    /// unset or empty variables.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::Config`] if a value does not parse or the
    /// result fails [`validate`](Self::validate).
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|s| !s.is_empty());
        let defaults = Self::default();

        let config = Self {
            feed: FeedConfig {
                capacity: parse_or(var("COINBOOK_FEED_CAPACITY"), defaults.feed.capacity)?,
            },
            simulation: SimulationConfig {
                market_buy_ceiling: parse_or(
                    var("COINBOOK_MARKET_BUY_CEILING"),
                    defaults.simulation.market_buy_ceiling,
                )?,
                market_sell_floor: parse_or(
                    var("COINBOOK_MARKET_SELL_FLOOR"),
                    defaults.simulation.market_sell_floor,
                )?,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CoinbookError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::Config`] for a feed capacity outside
    /// `1..=MAX_FEED_CAPACITY` or market limits that are not `ceiling > floor > 0`.
    pub fn validate(&self) -> crate::Result<()> {
        if self.feed.capacity == 0 {
            return Err(CoinbookError::Config(
                "feed capacity must be positive".to_string(),
            ));
        }
        if self.feed.capacity > MAX_FEED_CAPACITY {
            return Err(CoinbookError::Config(format!(
                "feed capacity {} exceeds {MAX_FEED_CAPACITY}",
                self.feed.capacity
            )));
        }
        let sim = &self.simulation;
        if sim.market_sell_floor <= Decimal::ZERO {
            return Err(CoinbookError::Config(format!(
                "market sell floor {} must be positive",
                sim.market_sell_floor
            )));
        }
        if sim.market_buy_ceiling <= sim.market_sell_floor {
            return Err(CoinbookError::Config(format!(
                "market buy ceiling {} must exceed sell floor {}",
                sim.market_buy_ceiling, sim.market_sell_floor
            )));
        }
        Ok(())
    }
}

/// Loads the application configuration from environment variables.
///
/// # Errors
///
/// Returns [`CoinbookError::Config`] if a variable is set to an unparsable
/// or out-of-range value.
pub fn fetch_config() -> crate::Result<AppConfig> {
    AppConfig::from_lookup(|name| std::env::var(name).ok())
}

fn parse_or<T>(raw: Option<String>, default: T) -> crate::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| CoinbookError::Config(format!("invalid value {value:?}: {e}"))),
        None => Ok(default),
    }
}
