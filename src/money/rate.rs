//! Exchange rates between two currencies.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Amount, Currency};
use crate::{CoinbookError, Result};

/// Fractional digits at which two rates are considered equal.
///
/// Reversing a rate divides by it, which is inexact for most values; the
/// residue lives far below this precision.
pub const RATE_PRECISION: u32 = 16;

/// The proportion between the values of two currencies:
/// `1 base = rate quote`.
///
/// Invariants, checked on construction and deserialization:
/// `base != quote`, `rate > 0`, and `1 / rate` representable and non-zero,
/// so that [`reverse`](Self::reverse) is total.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "RateRepr", into = "RateRepr")]
pub struct ExchangeRate {
    base: Currency,
    quote: Currency,
    rate: Decimal,
}

#[derive(Serialize, Deserialize)]
struct RateRepr {
    base: Currency,
    quote: Currency,
    rate: Decimal,
}

impl TryFrom<RateRepr> for ExchangeRate {
    type Error = CoinbookError;

    fn try_from(repr: RateRepr) -> Result<Self> {
        Self::new(repr.base, repr.quote, repr.rate)
    }
}

impl From<ExchangeRate> for RateRepr {
    fn from(rate: ExchangeRate) -> Self {
        Self {
            base: rate.base,
            quote: rate.quote,
            rate: rate.rate,
        }
    }
}

impl ExchangeRate {
    /// Creates the rate `1 base = rate quote`.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::InvalidRate`] if `base == quote`,
    /// `rate <= 0`, or the reciprocal of `rate` rounds to zero.
    pub fn new(base: Currency, quote: Currency, rate: Decimal) -> Result<Self> {
        if base == quote {
            return Err(CoinbookError::InvalidRate(format!(
                "base and quote are both {base}"
            )));
        }
        if rate <= Decimal::ZERO {
            return Err(CoinbookError::InvalidRate(format!(
                "rate {rate} {quote}/{base} is not positive"
            )));
        }
        if Decimal::ONE.checked_div(rate).is_none_or(|r| r.is_zero()) {
            return Err(CoinbookError::InvalidRate(format!(
                "rate {rate} {quote}/{base} has no representable reciprocal"
            )));
        }
        Ok(Self { base, quote, rate })
    }

    #[must_use]
    pub fn base(&self) -> Currency {
        self.base
    }

    #[must_use]
    pub fn quote(&self) -> Currency {
        self.quote
    }

    /// Units of `quote` per unit of `base`.
    #[must_use]
    pub fn rate(&self) -> Decimal {
        self.rate
    }

    #[must_use]
    pub fn contains(&self, currency: Currency) -> bool {
        self.base == currency || self.quote == currency
    }

    /// Returns the currency of the pair that is not `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::BadCurrency`] if `currency` is not in the pair.
    pub fn other_currency(&self, currency: Currency) -> Result<Currency> {
        if currency == self.base {
            Ok(self.quote)
        } else if currency == self.quote {
            Ok(self.base)
        } else {
            Err(self.bad_currency(currency))
        }
    }

    /// Converts `amount` into the other currency of the pair.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::BadCurrency`] if the amount's currency is
    /// not in the pair, or [`CoinbookError::Overflow`] if the converted
    /// value is out of range.
    pub fn convert(&self, amount: &Amount) -> Result<Amount> {
        let value = if amount.currency() == self.base {
            amount.value().checked_mul(self.rate)
        } else if amount.currency() == self.quote {
            amount.value().checked_div(self.rate)
        } else {
            return Err(self.bad_currency(amount.currency()));
        };
        let value = value.ok_or_else(|| {
            CoinbookError::Overflow(format!("converting {amount} at {self}"))
        })?;
        Ok(Amount::new(value, self.other_currency(amount.currency())?))
    }

    /// Converts `amount` into `target`.
    ///
    /// An amount already in `target` is returned unchanged, even when
    /// `target` is not part of the pair.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::BadCurrency`] if the conversion would land in
    /// a currency other than `target`, or the amount's currency is not in
    /// the pair.
    pub fn convert_to(&self, amount: &Amount, target: Currency) -> Result<Amount> {
        if amount.currency() == target {
            return Ok(*amount);
        }
        let converted = self.convert(amount)?;
        if converted.currency() != target {
            return Err(self.bad_currency(target));
        }
        Ok(converted)
    }

    /// Swaps base and quote, inverting the rate. The relative value of the
    /// currencies is preserved: `1 quote = 1/rate base`.
    ///
    /// Construction guarantees the reciprocal exists. A reciprocal is at
    /// most `10^28`, whose own reciprocal is non-zero, so the result upholds
    /// the same invariant.
    #[must_use]
    pub fn reverse(&self) -> ExchangeRate {
        Self {
            base: self.quote,
            quote: self.base,
            rate: Decimal::ONE / self.rate,
        }
    }

    /// Swaps base and quote but keeps the numeric rate, so the relative
    /// value of the two currencies is swapped: `1 quote = rate base`.
    #[must_use]
    pub fn invert(&self) -> ExchangeRate {
        Self {
            base: self.quote,
            quote: self.base,
            rate: self.rate,
        }
    }

    /// Returns the equivalent rate whose base is `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::BadCurrency`] if `currency` is not in the pair.
    pub fn per(&self, currency: Currency) -> Result<ExchangeRate> {
        if currency == self.base {
            Ok(*self)
        } else if currency == self.quote {
            Ok(self.reverse())
        } else {
            Err(self.bad_currency(currency))
        }
    }

    /// Chains two rates through their single shared currency.
    ///
    /// With `self` relating `A` and `X` and `other` relating `B` and `X`,
    /// the result is the rate `1 A = r B`. Both inputs are first oriented
    /// with `X` as base (`1 X = r_a A`, `1 X = r_b B`), giving
    /// `r = r_b / r_a`.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::IncompatibleRates`] unless the pairs share
    /// exactly one currency, [`CoinbookError::Overflow`] if the quotient is
    /// out of range, and [`CoinbookError::InvalidRate`] if it underflows to
    /// zero.
    pub fn compose(&self, other: &ExchangeRate) -> Result<ExchangeRate> {
        let shared: Vec<Currency> = [self.base, self.quote]
            .into_iter()
            .filter(|c| other.contains(*c))
            .collect();
        let &[common] = shared.as_slice() else {
            return Err(CoinbookError::IncompatibleRates {
                left: self.to_string(),
                right: other.to_string(),
            });
        };
        let a = self.per(common)?;
        let b = other.per(common)?;
        let rate = b.rate.checked_div(a.rate).ok_or_else(|| {
            CoinbookError::Overflow(format!("composing {self} with {other}"))
        })?;
        Self::new(a.quote, b.quote, rate)
    }

    /// Orders two rates over the same `base`/`quote` pair.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::CurrencyMismatch`] if the pairs differ,
    /// including when they are the same currencies in swapped order.
    pub fn compare(&self, other: &ExchangeRate) -> Result<Ordering> {
        self.ensure_same_pair(other)?;
        Ok(self.rate.cmp(&other.rate))
    }

    /// Sums two rates over the same pair.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::CurrencyMismatch`] if the pairs differ and
    /// [`CoinbookError::Overflow`] if the sum is out of range.
    pub fn add(&self, other: &ExchangeRate) -> Result<ExchangeRate> {
        self.ensure_same_pair(other)?;
        let rate = self.rate.checked_add(other.rate).ok_or_else(|| {
            CoinbookError::Overflow(format!("adding {self} and {other}"))
        })?;
        Self::new(self.base, self.quote, rate)
    }

    /// Subtracts `other` from `self`.
    ///
    /// # Errors
    ///
    /// Returns [`CoinbookError::CurrencyMismatch`] if the pairs differ and
    /// [`CoinbookError::InvalidRate`] if the difference is not positive.
    pub fn sub(&self, other: &ExchangeRate) -> Result<ExchangeRate> {
        self.ensure_same_pair(other)?;
        Self::new(self.base, self.quote, self.rate - other.rate)
    }

    fn ensure_same_pair(&self, other: &ExchangeRate) -> Result<()> {
        if self.base != other.base {
            return Err(CoinbookError::CurrencyMismatch {
                left: self.base,
                right: other.base,
            });
        }
        if self.quote != other.quote {
            return Err(CoinbookError::CurrencyMismatch {
                left: self.quote,
                right: other.quote,
            });
        }
        Ok(())
    }

    fn bad_currency(&self, currency: Currency) -> CoinbookError {
        CoinbookError::BadCurrency {
            rate: self.to_string(),
            currency,
        }
    }
}

impl PartialEq for ExchangeRate {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
            && self.quote == other.quote
            && self.rate.round_dp(RATE_PRECISION) == other.rate.round_dp(RATE_PRECISION)
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.rate.normalize(), self.quote, self.base)
    }
}
