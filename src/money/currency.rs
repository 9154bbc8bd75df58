//! Currencies and the process-wide currency registry.
//!
//! A [`Currency`] is an immutable identity value. Every currency the crate
//! knows about lives in a registry that is built once, on first access,
//! and is read-only afterwards. Use [`lookup`] to resolve exchange-supplied
//! codes and the constants in this module for the common ones.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Amount, ExchangeRate};
use crate::Result;

/// Whether a currency is issued by a state or is a crypto asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyKind {
    Fiat,
    Crypto,
}

/// A currency identified by its code (USD, EUR, BTC, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Currency {
    code: &'static str,
    kind: CurrencyKind,
}

pub const USD: Currency = Currency::fiat("USD");
pub const EUR: Currency = Currency::fiat("EUR");
pub const GBP: Currency = Currency::fiat("GBP");
pub const JPY: Currency = Currency::fiat("JPY");
pub const CNY: Currency = Currency::fiat("CNY");
pub const RUB: Currency = Currency::fiat("RUB");
pub const BTC: Currency = Currency::crypto("BTC");
pub const LTC: Currency = Currency::crypto("LTC");
pub const PPC: Currency = Currency::crypto("PPC");
pub const TRC: Currency = Currency::crypto("TRC");
pub const FTC: Currency = Currency::crypto("FTC");
pub const XRP: Currency = Currency::crypto("XRP");

/// ISO 4217 (2008 revision) codes.
const FIAT_CODES: &[&str] = &[
    "AFN", "EUR", "ALL", "DZD", "USD", "AOA", "XCD", "ARS", "AMD", "AWG", "AUD", "AZN", "BSD",
    "BHD", "BDT", "BBD", "BYR", "BZD", "XOF", "BMD", "BTN", "INR", "BOB", "BOV", "BAM", "BWP",
    "NOK", "BRL", "BND", "BGN", "BIF", "KHR", "XAF", "CAD", "CVE", "KYD", "CLF", "CLP", "CNY",
    "COP", "COU", "KMF", "CDF", "NZD", "CRC", "HRK", "CUC", "CUP", "ANG", "CZK", "DKK", "DJF",
    "DOP", "EGP", "SVC", "ERN", "ETB", "FKP", "FJD", "XPF", "GMD", "GEL", "GHS", "GIP", "GTQ",
    "GBP", "GNF", "GYD", "HTG", "HNL", "HKD", "HUF", "ISK", "IDR", "XDR", "IRR", "IQD", "ILS",
    "JMD", "JPY", "JOD", "KZT", "KES", "KPW", "KRW", "KWD", "KGS", "LAK", "LVL", "LBP", "LSL",
    "ZAR", "LRD", "LYD", "CHF", "LTL", "MOP", "MKD", "MGA", "MWK", "MYR", "MVR", "MRO", "MUR",
    "XUA", "MXN", "MXV", "MDL", "MNT", "MAD", "MZN", "MMK", "NAD", "NPR", "NIO", "NGN", "OMR",
    "PKR", "PAB", "PGK", "PYG", "PEN", "PHP", "PLN", "QAR", "RON", "RUB", "RWF", "SHP", "WST",
    "STD", "SAR", "RSD", "SCR", "SLL", "SGD", "XSU", "SBD", "SOS", "SSP", "LKR", "SDG", "SRD",
    "SZL", "SEK", "CHE", "CHW", "SYP", "TWD", "TJS", "TZS", "THB", "TOP", "TTD", "TND", "TRY",
    "TMT", "UGX", "UAH", "AED", "USN", "USS", "UYI", "UYU", "UZS", "VUV", "VEF", "VND", "YER",
    "ZMW", "ZWL", "XBA", "XBB", "XBC", "XBD", "XFU", "XTS", "XXX", "XAU", "XPD", "XPT", "XAG",
];

const CRYPTO_CODES: &[&str] = &["BTC", "LTC", "PPC", "TRC", "FTC", "XRP"];

static REGISTRY: LazyLock<HashMap<&'static str, Currency>> = LazyLock::new(|| {
    FIAT_CODES
        .iter()
        .map(|&code| Currency::fiat(code))
        .chain(CRYPTO_CODES.iter().map(|&code| Currency::crypto(code)))
        .map(|currency| (currency.code, currency))
        .collect()
});

/// Resolves a currency code against the registry.
///
/// Codes are matched case-sensitively; exchanges that send lowercase codes
/// should be normalized by the adapter.
pub fn lookup(code: &str) -> Option<Currency> {
    REGISTRY.get(code).copied()
}

/// Like [`lookup`], but fails with
/// [`CoinbookError::UnknownCurrency`](crate::CoinbookError::UnknownCurrency).
///
/// # Errors
///
/// Returns an error if `code` is not registered.
pub fn require(code: &str) -> Result<Currency> {
    lookup(code).ok_or_else(|| crate::CoinbookError::UnknownCurrency(code.to_string()))
}

/// Iterates over every registered currency, in no particular order.
pub fn registered() -> impl Iterator<Item = Currency> {
    REGISTRY.values().copied()
}

impl Currency {
    /// Declares a fiat currency.
    #[must_use]
    pub const fn fiat(code: &'static str) -> Self {
        Self {
            code,
            kind: CurrencyKind::Fiat,
        }
    }

    /// Declares a crypto currency.
    #[must_use]
    pub const fn crypto(code: &'static str) -> Self {
        Self {
            code,
            kind: CurrencyKind::Crypto,
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    #[must_use]
    pub fn kind(&self) -> CurrencyKind {
        self.kind
    }

    #[must_use]
    pub fn is_crypto(&self) -> bool {
        self.kind == CurrencyKind::Crypto
    }

    /// Builds an [`Amount`] of this currency.
    #[must_use]
    pub fn amount(self, value: Decimal) -> Amount {
        Amount::new(value, self)
    }

    /// The unit rate `1 other = 1 self`, used as a seed for derived rates.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRate`](crate::CoinbookError::InvalidRate) when both
    /// currencies are the same.
    pub fn per(self, other: Currency) -> Result<ExchangeRate> {
        ExchangeRate::new(other, self, Decimal::ONE)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Currency {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        lookup(&code)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown currency code {code:?}")))
    }
}
