//! Ticker snapshots.

use std::cmp::Ordering;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::Market;
use crate::money::{Amount, ExchangeRate};
use crate::{CoinbookError, Result};

/// Summary statistics of a market over the last [`Ticker::time_period`].
///
/// Deserialization runs the same checks as [`TickerBuilder::build`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TickerRepr")]
pub struct Ticker {
    pub market: Market,
    /// When the ticker was produced, preferably the exchange's server time.
    pub time: DateTime<Utc>,
    pub high: Option<ExchangeRate>,
    pub low: Option<ExchangeRate>,
    pub average: Option<ExchangeRate>,
    pub last: Option<ExchangeRate>,
    pub sell: Option<ExchangeRate>,
    pub buy: Option<ExchangeRate>,
    pub volume: Option<Amount>,
}

#[derive(Deserialize)]
struct TickerRepr {
    market: Market,
    time: DateTime<Utc>,
    #[serde(default)]
    high: Option<ExchangeRate>,
    #[serde(default)]
    low: Option<ExchangeRate>,
    #[serde(default)]
    average: Option<ExchangeRate>,
    #[serde(default)]
    last: Option<ExchangeRate>,
    #[serde(default)]
    sell: Option<ExchangeRate>,
    #[serde(default)]
    buy: Option<ExchangeRate>,
    #[serde(default)]
    volume: Option<Amount>,
}

impl TryFrom<TickerRepr> for Ticker {
    type Error = CoinbookError;

    fn try_from(repr: TickerRepr) -> Result<Self> {
        TickerBuilder {
            ticker: Self {
                market: repr.market,
                time: repr.time,
                high: repr.high,
                low: repr.low,
                average: repr.average,
                last: repr.last,
                sell: repr.sell,
                buy: repr.buy,
                volume: repr.volume,
            },
        }
        .build()
    }
}

impl Ticker {
    /// Window the rate fields are computed over.
    #[must_use]
    pub fn time_period() -> TimeDelta {
        TimeDelta::days(1)
    }

    /// Starts a ticker with every field unset.
    #[must_use]
    pub fn builder(market: &Market, time: DateTime<Utc>) -> TickerBuilder {
        TickerBuilder {
            ticker: Self {
                market: market.clone(),
                time,
                high: None,
                low: None,
                average: None,
                last: None,
                sell: None,
                buy: None,
                volume: None,
            },
        }
    }
}

/// Builder for [`Ticker`] validating field consistency on [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct TickerBuilder {
    ticker: Ticker,
}

impl TickerBuilder {
    #[must_use]
    pub fn with_high(mut self, rate: ExchangeRate) -> Self {
        self.ticker.high = Some(rate);
        self
    }

    #[must_use]
    pub fn with_low(mut self, rate: ExchangeRate) -> Self {
        self.ticker.low = Some(rate);
        self
    }

    #[must_use]
    pub fn with_average(mut self, rate: ExchangeRate) -> Self {
        self.ticker.average = Some(rate);
        self
    }

    #[must_use]
    pub fn with_last(mut self, rate: ExchangeRate) -> Self {
        self.ticker.last = Some(rate);
        self
    }

    #[must_use]
    pub fn with_sell(mut self, rate: ExchangeRate) -> Self {
        self.ticker.sell = Some(rate);
        self
    }

    #[must_use]
    pub fn with_buy(mut self, rate: ExchangeRate) -> Self {
        self.ticker.buy = Some(rate);
        self
    }

    #[must_use]
    pub fn with_volume(mut self, volume: Amount) -> Self {
        self.ticker.volume = Some(volume);
        self
    }

    /// Validates and returns the ticker.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::InvalidTicker`] if a rate does not relate the
    /// market's currencies, the volume is in a foreign currency, or
    /// `buy > sell`.
    pub fn build(self) -> Result<Ticker> {
        let t = self.ticker;
        let market = &t.market;
        let rates = [t.high, t.low, t.average, t.last, t.sell, t.buy];
        for rate in rates.iter().flatten() {
            if !(rate.contains(market.item()) && rate.contains(market.priced_in())) {
                return Err(CoinbookError::InvalidTicker(format!(
                    "rate {rate} does not match {market}"
                )));
            }
        }
        if let Some(volume) = &t.volume {
            if !market.contains(volume.currency()) {
                return Err(CoinbookError::InvalidTicker(format!(
                    "volume {volume} is not traded on {market}"
                )));
            }
        }
        if let (Some(buy), Some(sell)) = (&t.buy, &t.sell) {
            let buy = buy.per(market.item())?;
            let sell = sell.per(market.item())?;
            if buy.compare(&sell)? == Ordering::Greater {
                return Err(CoinbookError::InvalidTicker(format!(
                    "buy {buy} is above sell {sell}"
                )));
            }
        }
        Ok(t)
    }
}
