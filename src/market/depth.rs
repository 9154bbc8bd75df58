//! Order book depth.
//!
//! Exchange adapters hand over raw `(price, qty)` records as
//! [`PriceLevel`]s; [`Depth::from_levels`] wraps them into typed resting
//! orders. Ordering is always computed through [`unit_price_in`], never
//! stored, so the same depth can be viewed from either currency.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Market, Order};
use crate::money::{Amount, Currency};
use crate::{CoinbookError, Result};

/// A single price level in the order book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub qty: Decimal,
}

/// Raw depth as returned by an exchange adapter, before typing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDepth {
    pub asks: Vec<PriceLevel>,
    pub bids: Vec<PriceLevel>,
}

/// Resting orders on both sides of a market.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Depth {
    pub asks: Vec<Order>,
    pub bids: Vec<Order>,
}

/// Price of one unit of `reference`, expressed in the entry's other
/// currency. This is the sort key for depth entries.
///
/// # Errors
///
/// Returns [`CoinbookError::InvalidOrder`] if the entry has no limit rate,
/// or [`CoinbookError::BadCurrency`] if its rate does not cover `reference`.
pub fn unit_price_in(entry: &Order, reference: Currency) -> Result<Decimal> {
    let rate = entry.limit_rate().ok_or_else(|| {
        CoinbookError::InvalidOrder(format!("depth entry {entry} has no rate"))
    })?;
    Ok(rate.convert(&Amount::new(Decimal::ONE, reference))?.value())
}

impl Depth {
    /// Wraps raw levels into ask and bid orders of `market`.
    ///
    /// Quantities are amounts of the item; prices are in the market's
    /// pricing currency. Zero-quantity levels are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::InvalidRate`] for non-positive prices and
    /// [`CoinbookError::InvalidOrder`] for negative quantities.
    pub fn from_levels(
        market: &Market,
        asks: &[PriceLevel],
        bids: &[PriceLevel],
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let to_orders = |levels: &[PriceLevel], ask: bool| -> Result<Vec<Order>> {
            let mut orders = Vec::with_capacity(levels.len());
            for level in levels {
                if level.qty.is_zero() {
                    continue;
                }
                if level.qty.is_sign_negative() {
                    return Err(CoinbookError::InvalidOrder(format!(
                        "negative volume {} at price {}",
                        level.qty, level.price
                    )));
                }
                let amount = market.item().amount(level.qty);
                let rate = market.rate(level.price)?;
                let order = if ask {
                    Order::ask(market, amount, rate)
                } else {
                    Order::bid(market, amount, rate)
                };
                orders.push(order.with_timestamp(timestamp));
            }
            Ok(orders)
        };

        Ok(Self {
            asks: to_orders(asks, true)?,
            bids: to_orders(bids, false)?,
        })
    }

    /// Builds a depth from an adapter's raw records.
    ///
    /// # Errors
    ///
    /// See [`Depth::from_levels`].
    pub fn from_raw(market: &Market, raw: &RawDepth, timestamp: DateTime<Utc>) -> Result<Self> {
        Self::from_levels(market, &raw.asks, &raw.bids, timestamp)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.asks.is_empty() && self.bids.is_empty()
    }

    /// Asks ordered cheapest first by unit price of `reference`.
    ///
    /// # Errors
    ///
    /// See [`unit_price_in`].
    pub fn asks_ascending(&self, reference: Currency) -> Result<Vec<&Order>> {
        sorted_by_unit_price(&self.asks, reference, false)
    }

    /// Bids ordered most generous first by unit price of `reference`.
    ///
    /// # Errors
    ///
    /// See [`unit_price_in`].
    pub fn bids_descending(&self, reference: Currency) -> Result<Vec<&Order>> {
        sorted_by_unit_price(&self.bids, reference, true)
    }

    /// Sorts both sides in place: asks ascending, bids descending.
    ///
    /// # Errors
    ///
    /// See [`unit_price_in`]; the depth is left untouched on error.
    pub fn sort(&mut self, reference: Currency) -> Result<()> {
        let asks = keyed(&self.asks, reference)?;
        let bids = keyed(&self.bids, reference)?;
        self.asks = reorder(std::mem::take(&mut self.asks), asks, false);
        self.bids = reorder(std::mem::take(&mut self.bids), bids, true);
        Ok(())
    }

    /// Lowest ask unit price of `reference`.
    ///
    /// # Errors
    ///
    /// See [`unit_price_in`].
    pub fn best_ask(&self, reference: Currency) -> Result<Option<Decimal>> {
        Ok(keyed(&self.asks, reference)?.into_iter().min())
    }

    /// Highest bid unit price of `reference`.
    ///
    /// # Errors
    ///
    /// See [`unit_price_in`].
    pub fn best_bid(&self, reference: Currency) -> Result<Option<Decimal>> {
        Ok(keyed(&self.bids, reference)?.into_iter().max())
    }

    /// Best ask minus best bid, when both sides are present.
    ///
    /// # Errors
    ///
    /// See [`unit_price_in`].
    pub fn spread(&self, reference: Currency) -> Result<Option<Decimal>> {
        Ok(match (self.best_ask(reference)?, self.best_bid(reference)?) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        })
    }
}

fn keyed(orders: &[Order], reference: Currency) -> Result<Vec<Decimal>> {
    orders
        .iter()
        .map(|order| unit_price_in(order, reference))
        .collect()
}

fn sorted_by_unit_price(
    orders: &[Order],
    reference: Currency,
    descending: bool,
) -> Result<Vec<&Order>> {
    let mut entries: Vec<(Decimal, &Order)> = keyed(orders, reference)?
        .into_iter()
        .zip(orders)
        .collect();
    if descending {
        entries.sort_by(|a, b| b.0.cmp(&a.0));
    } else {
        entries.sort_by(|a, b| a.0.cmp(&b.0));
    }
    Ok(entries.into_iter().map(|(_, order)| order).collect())
}

fn reorder(orders: Vec<Order>, keys: Vec<Decimal>, descending: bool) -> Vec<Order> {
    let mut entries: Vec<(Decimal, Order)> = keys.into_iter().zip(orders).collect();
    if descending {
        entries.sort_by(|a, b| b.0.cmp(&a.0));
    } else {
        entries.sort_by(|a, b| a.0.cmp(&b.0));
    }
    entries.into_iter().map(|(_, order)| order).collect()
}
