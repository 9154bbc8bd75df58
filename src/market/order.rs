//! Orders and completed trades.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Market;
use crate::money::{Amount, ExchangeRate};
use crate::{CoinbookError, Result};

/// How an order should be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    /// Limit order to buy the item at or below the limit rate.
    Bid,
    /// Limit order to sell the item at or above the limit rate.
    Ask,
    /// Buy at whatever rates are available.
    MarketBuy,
    /// Sell at whatever rates are available.
    MarketSell,
}

impl OrderKind {
    /// `true` for orders that acquire the item.
    #[must_use]
    pub fn is_buy(self) -> bool {
        matches!(self, Self::Bid | Self::MarketBuy)
    }

    /// `true` for orders that carry a limit rate.
    #[must_use]
    pub fn is_limit(self) -> bool {
        matches!(self, Self::Bid | Self::Ask)
    }
}

/// An order to exchange `from_amount`, optionally bounded by a limit rate.
///
/// Bid and ask orders always carry a limit rate; market orders never do.
/// The invariant is enforced by every constructor. Deserialized orders
/// must also pass [`Market::check_order`] against their own market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OrderRepr")]
pub struct Order {
    id: Option<String>,
    market: Market,
    timestamp: DateTime<Utc>,
    kind: OrderKind,
    from_amount: Amount,
    limit_rate: Option<ExchangeRate>,
}

#[derive(Deserialize)]
struct OrderRepr {
    #[serde(default)]
    id: Option<String>,
    market: Market,
    timestamp: DateTime<Utc>,
    kind: OrderKind,
    from_amount: Amount,
    #[serde(default)]
    limit_rate: Option<ExchangeRate>,
}

impl TryFrom<OrderRepr> for Order {
    type Error = CoinbookError;

    fn try_from(repr: OrderRepr) -> Result<Self> {
        let mut order = Self::new(&repr.market, repr.kind, repr.from_amount, repr.limit_rate)?
            .with_timestamp(repr.timestamp);
        order.id = repr.id;
        repr.market.check_order(&order)?;
        Ok(order)
    }
}

impl Order {
    /// Creates an order timestamped now.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::InvalidOrder`] if a bid/ask lacks a limit
    /// rate or a market order has one.
    pub fn new(
        market: &Market,
        kind: OrderKind,
        from_amount: Amount,
        limit_rate: Option<ExchangeRate>,
    ) -> Result<Self> {
        match (kind.is_limit(), limit_rate.is_some()) {
            (true, false) => {
                return Err(CoinbookError::InvalidOrder(format!(
                    "{kind:?} order requires a limit rate"
                )));
            }
            (false, true) => {
                return Err(CoinbookError::InvalidOrder(format!(
                    "{kind:?} order cannot carry a limit rate"
                )));
            }
            _ => {}
        }
        Ok(Self::unchecked(market, kind, from_amount, limit_rate))
    }

    /// A limit order to buy, spending or acquiring `amount`.
    #[must_use]
    pub fn bid(market: &Market, amount: Amount, limit: ExchangeRate) -> Self {
        Self::unchecked(market, OrderKind::Bid, amount, Some(limit))
    }

    /// A limit order to sell, giving up or raising `amount`.
    #[must_use]
    pub fn ask(market: &Market, amount: Amount, limit: ExchangeRate) -> Self {
        Self::unchecked(market, OrderKind::Ask, amount, Some(limit))
    }

    #[must_use]
    pub fn market_buy(market: &Market, amount: Amount) -> Self {
        Self::unchecked(market, OrderKind::MarketBuy, amount, None)
    }

    #[must_use]
    pub fn market_sell(market: &Market, amount: Amount) -> Self {
        Self::unchecked(market, OrderKind::MarketSell, amount, None)
    }

    fn unchecked(
        market: &Market,
        kind: OrderKind,
        from_amount: Amount,
        limit_rate: Option<ExchangeRate>,
    ) -> Self {
        Self {
            id: None,
            market: market.clone(),
            timestamp: Utc::now(),
            kind,
            from_amount,
            limit_rate,
        }
    }

    /// Sets the exchange-side identifier.
    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Exchange-side identifier, set once the order has been placed.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn market(&self) -> &Market {
        &self.market
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    #[must_use]
    pub fn from_amount(&self) -> Amount {
        self.from_amount
    }

    #[must_use]
    pub fn limit_rate(&self) -> Option<ExchangeRate> {
        self.limit_rate
    }

    #[must_use]
    pub fn is_bid(&self) -> bool {
        self.kind == OrderKind::Bid
    }

    #[must_use]
    pub fn is_ask(&self) -> bool {
        self.kind == OrderKind::Ask
    }

    #[must_use]
    pub fn is_market_buy(&self) -> bool {
        self.kind == OrderKind::MarketBuy
    }

    #[must_use]
    pub fn is_market_sell(&self) -> bool {
        self.kind == OrderKind::MarketSell
    }

    /// The counter-amount of `from_amount` at the limit rate, i.e. the most
    /// this order can cost (bids) or the least it can raise (asks).
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::InvalidOrder`] for market orders and
    /// [`CoinbookError::BadCurrency`] if the limit rate does not cover the
    /// order's currency.
    pub fn expense(&self) -> Result<Amount> {
        let limit = self.limit_rate.ok_or_else(|| {
            CoinbookError::InvalidOrder(format!("{:?} order has no limit rate", self.kind))
        })?;
        limit.convert(&self.from_amount)
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.limit_rate {
            Some(limit) => write!(f, "{:?} {} @ {}", self.kind, self.from_amount, limit),
            None => write!(f, "{:?} {}", self.kind, self.from_amount),
        }
    }
}

/// A completed exchange of `from_amount` at `exchange_rate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TradeRepr")]
pub struct Trade {
    id: Option<String>,
    market: Market,
    timestamp: DateTime<Utc>,
    from_amount: Amount,
    exchange_rate: ExchangeRate,
}

#[derive(Deserialize)]
struct TradeRepr {
    #[serde(default)]
    id: Option<String>,
    market: Market,
    timestamp: DateTime<Utc>,
    from_amount: Amount,
    exchange_rate: ExchangeRate,
}

impl TryFrom<TradeRepr> for Trade {
    type Error = CoinbookError;

    fn try_from(repr: TradeRepr) -> Result<Self> {
        let mut trade = Self::new(
            &repr.market,
            repr.timestamp,
            repr.from_amount,
            repr.exchange_rate,
        )?;
        trade.id = repr.id;
        Ok(trade)
    }
}

impl Trade {
    /// Records a trade.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::BadCurrency`] if `exchange_rate` does not
    /// cover the currency of `from_amount`.
    pub fn new(
        market: &Market,
        timestamp: DateTime<Utc>,
        from_amount: Amount,
        exchange_rate: ExchangeRate,
    ) -> Result<Self> {
        exchange_rate.other_currency(from_amount.currency())?;
        Ok(Self {
            id: None,
            market: market.clone(),
            timestamp,
            from_amount,
            exchange_rate,
        })
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn market(&self) -> &Market {
        &self.market
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn from_amount(&self) -> Amount {
        self.from_amount
    }

    #[must_use]
    pub fn exchange_rate(&self) -> ExchangeRate {
        self.exchange_rate
    }

    /// What the other side received.
    ///
    /// # Errors
    ///
    /// Never fails for trades built through [`Trade::new`]; the error is
    /// that of [`ExchangeRate::convert`].
    pub fn to_amount(&self) -> Result<Amount> {
        self.exchange_rate.convert(&self.from_amount)
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from_amount, self.exchange_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::currency::{BTC, USD};
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn market() -> Market {
        Market::new("test", USD, BTC)
    }

    #[test]
    fn limit_orders_require_a_rate() {
        let m = market();
        let err = Order::new(&m, OrderKind::Bid, USD.amount(dec!(10)), None).unwrap_err();
        assert!(matches!(err, CoinbookError::InvalidOrder(_)));
        assert!(Order::new(&m, OrderKind::Ask, BTC.amount(dec!(1)), None).is_err());
    }

    #[test]
    fn market_orders_reject_a_rate() {
        let m = market();
        let rate = m.rate(dec!(100)).ok();
        assert!(Order::new(&m, OrderKind::MarketBuy, USD.amount(dec!(10)), rate).is_err());
        assert!(Order::new(&m, OrderKind::MarketSell, USD.amount(dec!(10)), None).is_ok());
    }

    #[test]
    fn expense_converts_at_limit() {
        let m = market();
        let bid = Order::bid(&m, BTC.amount(dec!(2)), m.rate(dec!(150)).unwrap());
        assert_eq!(bid.expense().unwrap(), USD.amount(dec!(300)));

        let by_value = Order::bid(&m, USD.amount(dec!(300)), m.rate(dec!(150)).unwrap());
        assert_eq!(by_value.expense().unwrap(), BTC.amount(dec!(2)));
    }

    #[test]
    fn market_order_has_no_expense() {
        let m = market();
        let order = Order::market_sell(&m, BTC.amount(dec!(1)));
        assert!(matches!(
            order.expense(),
            Err(CoinbookError::InvalidOrder(_))
        ));
    }

    #[test]
    fn kind_predicates() {
        let m = market();
        let rate = m.rate(dec!(1)).unwrap();
        assert!(Order::bid(&m, USD.amount(dec!(1)), rate).is_bid());
        assert!(Order::ask(&m, USD.amount(dec!(1)), rate).is_ask());
        assert!(Order::market_buy(&m, USD.amount(dec!(1))).is_market_buy());
        assert!(Order::market_sell(&m, USD.amount(dec!(1))).is_market_sell());
        assert!(OrderKind::MarketBuy.is_buy());
        assert!(!OrderKind::Ask.is_buy());
    }

    #[test]
    fn placed_order_carries_id() {
        let m = market();
        let ts = Utc.with_ymd_and_hms(2013, 4, 10, 12, 0, 0).unwrap();
        let order = Order::market_buy(&m, USD.amount(dec!(1)))
            .with_id("oid-1")
            .with_timestamp(ts);
        assert_eq!(order.id(), Some("oid-1"));
        assert_eq!(order.timestamp(), ts);
    }

    #[test]
    fn trade_converts_to_counter_amount() {
        let m = market();
        let ts = Utc::now();
        let trade = Trade::new(&m, ts, BTC.amount(dec!(0.5)), m.rate(dec!(120)).unwrap()).unwrap();
        assert_eq!(trade.to_amount().unwrap(), USD.amount(dec!(60)));
        assert_eq!(trade.to_string(), "0.5 BTC -> 120 USD/BTC");
    }

    #[test]
    fn trade_rejects_foreign_amount() {
        let m = market();
        let rate = m.rate(dec!(120)).unwrap();
        let err = Trade::new(&m, Utc::now(), crate::money::currency::EUR.amount(dec!(1)), rate)
            .unwrap_err();
        assert!(matches!(err, CoinbookError::BadCurrency { .. }));
    }

    #[test]
    fn order_kind_serializes_in_screaming_case() {
        assert_eq!(
            serde_json::to_string(&OrderKind::MarketBuy).unwrap(),
            "\"MARKET_BUY\""
        );
    }

    #[test]
    fn order_deserialization_revalidates() {
        let m = market();
        let bid = Order::bid(&m, USD.amount(dec!(150)), m.rate(dec!(100)).unwrap()).with_id("o-7");
        let json = serde_json::to_string(&bid).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bid);

        let mut value = serde_json::to_value(&bid).unwrap();
        value["limit_rate"] = serde_json::Value::Null;
        assert!(serde_json::from_value::<Order>(value).is_err());

        let mut value = serde_json::to_value(&bid).unwrap();
        value["from_amount"]["value"] = serde_json::json!("-1");
        assert!(serde_json::from_value::<Order>(value).is_err());
    }

    #[test]
    fn trade_deserialization_revalidates() {
        let m = market();
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let trade = Trade::new(&m, at, BTC.amount(dec!(2)), m.rate(dec!(100)).unwrap())
            .unwrap()
            .with_id("t-9");
        let json = serde_json::to_string(&trade).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trade);

        let mut value = serde_json::to_value(&trade).unwrap();
        value["from_amount"]["currency"] = serde_json::json!("EUR");
        assert!(serde_json::from_value::<Trade>(value).is_err());
    }
}
