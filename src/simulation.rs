//! Order-book matching simulation.
//!
//! Answers "if this order were submitted against this depth right now, how
//! much of it would fill and what would change hands". The simulation is a
//! pure function of the depth and the order: nothing is mutated and no
//! liquidity beyond the given depth is assumed.
//!
//! An order may be denominated in either currency of its market. A bid for
//! `100 USD` spends dollars until they run out; a bid for `1 BTC` acquires
//! bitcoin until one is bought. Asks mirror this. All four cases share one
//! walk: only the side of the book and the direction of the limit differ.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::config::SimulationConfig;
use crate::market::{Depth, MarketData, Order, unit_price_in};
use crate::money::{Amount, ExchangeRate};
use crate::{CoinbookError, Result};

/// Outcome of simulating one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    /// The order's `from_amount`.
    pub requested: Amount,
    /// Portion of `requested` left unfilled; zero on a full fill.
    pub remaining: Amount,
    /// Counter-amount exchanged for the filled portion, in the market's
    /// other currency.
    pub transacted: Amount,
    /// Number of depth levels that contributed to the fill.
    pub levels_touched: usize,
}

impl Fill {
    /// `true` when nothing remains unfilled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Portion of the requested amount that was filled.
    #[must_use]
    pub fn filled(&self) -> Amount {
        Amount::new(
            self.requested.value() - self.remaining.value(),
            self.requested.currency(),
        )
    }

    /// Average rate of the fill as `1 filled = r transacted`, or `None`
    /// when nothing filled or the rate is out of range.
    #[must_use]
    pub fn average_rate(&self) -> Option<ExchangeRate> {
        let filled = self.filled();
        if filled.is_zero() || self.transacted.is_zero() {
            return None;
        }
        let rate = self.transacted.value().checked_div(filled.value())?;
        ExchangeRate::new(filled.currency(), self.transacted.currency(), rate).ok()
    }
}

/// Simulates orders against depth snapshots.
#[derive(Debug, Clone, Default)]
pub struct OrderSimulator {
    config: SimulationConfig,
}

impl OrderSimulator {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Walks the book on the opposite side of `order` and returns the fill.
    ///
    /// Buys consume asks cheapest first, sells consume bids most generous
    /// first. The walk stops at the first level priced strictly beyond the
    /// order's limit, when the order is exhausted, or when the book is.
    /// Market orders use the configured ceiling/floor as their limit.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::InvalidOrder`] if the order does not fit its
    /// market, and propagates currency errors from malformed depth entries.
    pub fn simulate(&self, depth: &Depth, order: &Order) -> Result<Fill> {
        let market = order.market();
        market.check_order(order)?;

        let item = market.item();
        let requested = order.from_amount();
        let counter = market.counter_currency(requested.currency())?;
        let buying = order.kind().is_buy();
        let limit_price = self.limit_price(order)?;

        let levels = if buying {
            depth.asks_ascending(item)?
        } else {
            depth.bids_descending(item)?
        };

        let mut bucket = requested;
        let mut transacted = Amount::zero(counter);
        let mut levels_touched = 0;

        for entry in levels {
            if bucket.is_zero() {
                break;
            }
            let price = unit_price_in(entry, item)?;
            let beyond_limit = if buying {
                price > limit_price
            } else {
                price < limit_price
            };
            if beyond_limit {
                debug!(%price, %limit_price, "limit reached");
                break;
            }

            let rate = entry.limit_rate().ok_or_else(|| {
                CoinbookError::InvalidOrder(format!("depth entry {entry} has no rate"))
            })?;
            let next_chunk = rate.convert_to(&entry.from_amount(), requested.currency())?;
            levels_touched += 1;

            if next_chunk.compare(&bucket)? == Ordering::Greater {
                transacted = transacted.add(&rate.convert_to(&bucket, counter)?)?;
                bucket = Amount::zero(requested.currency());
                trace!(%price, "partial fill of level");
                break;
            }

            transacted = transacted.add(&rate.convert_to(&next_chunk, counter)?)?;
            bucket = bucket.sub(&next_chunk)?;
            trace!(%price, %next_chunk, %bucket, "consumed level");
        }

        debug!(
            order = %order,
            remaining = %bucket,
            transacted = %transacted,
            levels_touched,
            "simulated order"
        );

        Ok(Fill {
            requested,
            remaining: bucket,
            transacted,
            levels_touched,
        })
    }

    /// Limit expressed as a price of one item, synthesizing one for market
    /// orders.
    fn limit_price(&self, order: &Order) -> Result<Decimal> {
        let item = order.market().item();
        match order.limit_rate() {
            Some(limit) => Ok(limit.per(item)?.rate()),
            None if order.kind().is_buy() => Ok(self.config.market_buy_ceiling),
            None => Ok(self.config.market_sell_floor),
        }
    }
}

/// Simulates `order` against `depth` with the default configuration.
///
/// # Errors
///
/// See [`OrderSimulator::simulate`].
pub fn simulate_order(depth: &Depth, order: &Order) -> Result<Fill> {
    OrderSimulator::default().simulate(depth, order)
}

/// Fetches the current depth from `source` and simulates `order` against it.
///
/// The result reflects the book at fetch time; by the time a real order
/// reached the exchange the book may have moved.
///
/// # Errors
///
/// Returns [`CoinbookError::InvalidOrder`] if `order` is for a different
/// market than `source`, and propagates fetch and simulation errors.
pub async fn simulate_live<M: MarketData>(
    source: &M,
    simulator: &OrderSimulator,
    order: &Order,
) -> Result<Fill> {
    source.market().check_order(order)?;
    let depth = source.fetch_depth().await?;
    simulator.simulate(&depth, order)
}
