//! Tagged monetary amounts.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Currency, ExchangeRate};
use crate::{CoinbookError, Result};

/// Fractional digits guaranteed to survive conversions (one satoshi).
pub const AMOUNT_PRECISION: u32 = 8;

/// A decimal quantity of one currency.
///
/// Amounts are immutable values: every operation returns a new instance.
/// Operations between two amounts fail with
/// [`CurrencyMismatch`](CoinbookError::CurrencyMismatch) unless both carry
/// the same currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    value: Decimal,
    currency: Currency,
}

impl Amount {
    #[must_use]
    pub fn new(value: Decimal, currency: Currency) -> Self {
        Self { value, currency }
    }

    /// A zero amount of `currency`.
    #[must_use]
    pub fn zero(currency: Currency) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    #[must_use]
    pub fn value(&self) -> Decimal {
        self.value
    }

    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Adds two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::CurrencyMismatch`] if the currencies differ
    /// and [`CoinbookError::Overflow`] if the sum is out of range.
    pub fn add(&self, other: &Amount) -> Result<Amount> {
        self.ensure_same_currency(other)?;
        let value = self
            .value
            .checked_add(other.value)
            .ok_or_else(|| CoinbookError::Overflow(format!("{self} + {other}")))?;
        Ok(Self::new(value, self.currency))
    }

    /// Subtracts `other` from `self`.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::CurrencyMismatch`] if the currencies differ
    /// and [`CoinbookError::Overflow`] if the difference is out of range.
    pub fn sub(&self, other: &Amount) -> Result<Amount> {
        self.ensure_same_currency(other)?;
        let value = self
            .value
            .checked_sub(other.value)
            .ok_or_else(|| CoinbookError::Overflow(format!("{self} - {other}")))?;
        Ok(Self::new(value, self.currency))
    }

    /// Scales the value, keeping the currency.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::Overflow`] if the product is out of range.
    pub fn scale(&self, factor: Decimal) -> Result<Amount> {
        let value = self
            .value
            .checked_mul(factor)
            .ok_or_else(|| CoinbookError::Overflow(format!("{self} * {factor}")))?;
        Ok(Self::new(value, self.currency))
    }

    /// Orders two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::CurrencyMismatch`] if the currencies differ.
    pub fn compare(&self, other: &Amount) -> Result<Ordering> {
        self.ensure_same_currency(other)?;
        Ok(self.value.cmp(&other.value))
    }

    /// Rounds the value to `dp` fractional digits (banker's rounding).
    #[must_use]
    pub fn round_dp(&self, dp: u32) -> Amount {
        Self::new(self.value.round_dp(dp), self.currency)
    }

    /// Interprets this amount as the price of one unit of `unit`.
    ///
    /// `100 USD` per `BTC` is the rate `1 BTC = 100 USD`.
    ///
    /// # Errors
    ///
    /// Fails with [`CoinbookError::InvalidRate`] if `unit` is this amount's
    /// currency or the value is not positive.
    pub fn per(&self, unit: Currency) -> Result<ExchangeRate> {
        ExchangeRate::new(unit, self.currency, self.value)
    }

    fn ensure_same_currency(&self, other: &Amount) -> Result<()> {
        if self.currency != other.currency {
            return Err(CoinbookError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(())
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Self::new(-self.value, self.currency)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value.normalize(), self.currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::currency::{BTC, USD};
    use rust_decimal_macros::dec;

    #[test]
    fn add_and_sub_same_currency() {
        let a = USD.amount(dec!(10.5));
        let b = USD.amount(dec!(2.25));
        assert_eq!(a.add(&b).unwrap(), USD.amount(dec!(12.75)));
        assert_eq!(a.sub(&b).unwrap(), USD.amount(dec!(8.25)));
    }

    #[test]
    fn mixed_currency_arithmetic_fails() {
        let usd = USD.amount(dec!(1));
        let btc = BTC.amount(dec!(1));
        for result in [usd.add(&btc), usd.sub(&btc)] {
            assert!(matches!(
                result,
                Err(CoinbookError::CurrencyMismatch { left, right }) if left == USD && right == BTC
            ));
        }
        assert!(matches!(
            usd.compare(&btc),
            Err(CoinbookError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn scalar_multiplication_keeps_currency() {
        let a = BTC.amount(dec!(0.5));
        assert_eq!(a.scale(dec!(3)).unwrap(), BTC.amount(dec!(1.5)));
        assert_eq!(a.scale(dec!(0)).unwrap(), Amount::zero(BTC));
    }

    #[test]
    fn out_of_range_results_are_errors() {
        let huge = USD.amount(Decimal::MAX);
        assert!(matches!(huge.add(&huge), Err(CoinbookError::Overflow(_))));
        assert!(matches!(huge.sub(&-huge), Err(CoinbookError::Overflow(_))));
        assert!(matches!(huge.scale(dec!(2)), Err(CoinbookError::Overflow(_))));
        assert_eq!(huge.sub(&huge).unwrap(), Amount::zero(USD));
    }

    #[test]
    fn compare_orders_values() {
        let small = USD.amount(dec!(1));
        let big = USD.amount(dec!(2));
        assert_eq!(small.compare(&big).unwrap(), Ordering::Less);
        assert_eq!(big.compare(&small).unwrap(), Ordering::Greater);
        assert_eq!(small.compare(&USD.amount(dec!(1.00))).unwrap(), Ordering::Equal);
    }

    #[test]
    fn negation_and_zero() {
        let a = USD.amount(dec!(4));
        assert_eq!(-a, USD.amount(dec!(-4)));
        assert!(a.add(&-a).unwrap().is_zero());
    }

    #[test]
    fn amount_per_currency_is_a_rate() {
        let rate = USD.amount(dec!(100)).per(BTC).unwrap();
        assert_eq!(rate.base(), BTC);
        assert_eq!(rate.quote(), USD);
        assert_eq!(rate.rate(), dec!(100));
    }

    #[test]
    fn display_is_normalized() {
        assert_eq!(USD.amount(dec!(12.500)).to_string(), "12.5 USD");
    }
}
