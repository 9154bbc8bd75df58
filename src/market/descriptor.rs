//! Market descriptors.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Order;
use crate::money::{Currency, ExchangeRate};
use crate::{CoinbookError, Result};

/// A place where one currency (the *item*) is traded for another (the
/// currency it is *priced in*), e.g. BTC priced in USD.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Market {
    name: String,
    priced_in: Currency,
    item: Currency,
}

impl Market {
    #[must_use]
    pub fn new(name: &str, priced_in: Currency, item: Currency) -> Self {
        Self {
            name: name.to_string(),
            priced_in,
            item,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The currency prices are quoted in.
    #[must_use]
    pub fn priced_in(&self) -> Currency {
        self.priced_in
    }

    /// The currency being bought and sold.
    #[must_use]
    pub fn item(&self) -> Currency {
        self.item
    }

    #[must_use]
    pub fn contains(&self, currency: Currency) -> bool {
        currency == self.priced_in || currency == self.item
    }

    /// Returns the market currency that is not `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::InvalidOrder`] if `currency` is not traded here.
    pub fn counter_currency(&self, currency: Currency) -> Result<Currency> {
        if currency == self.priced_in {
            Ok(self.item)
        } else if currency == self.item {
            Ok(self.priced_in)
        } else {
            Err(CoinbookError::InvalidOrder(format!(
                "{currency} is not traded on {self}"
            )))
        }
    }

    /// The rate `1 item = price priced_in`.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::InvalidRate`] if `price` is not positive.
    pub fn rate(&self, price: Decimal) -> Result<ExchangeRate> {
        ExchangeRate::new(self.item, self.priced_in, price)
    }

    /// Checks that an order can be handled by this market.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::InvalidOrder`] if the order belongs to another
    /// market, is denominated in a foreign currency, has a non-positive
    /// amount, or carries a limit rate that does not relate the market's two
    /// currencies.
    pub fn check_order(&self, order: &Order) -> Result<()> {
        if order.market() != self {
            return Err(CoinbookError::InvalidOrder(format!(
                "order for {} submitted to {self}",
                order.market()
            )));
        }
        self.counter_currency(order.from_amount().currency())?;
        if order.from_amount().value() <= Decimal::ZERO {
            return Err(CoinbookError::InvalidOrder(format!(
                "order amount {} is not positive",
                order.from_amount()
            )));
        }
        if let Some(limit) = order.limit_rate() {
            let spans_market = limit.contains(self.item) && limit.contains(self.priced_in);
            if !spans_market {
                return Err(CoinbookError::InvalidOrder(format!(
                    "limit rate {limit} does not match {self}"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.name, self.item, self.priced_in)
    }
}
