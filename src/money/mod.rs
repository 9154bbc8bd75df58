//! Monetary algebra: currencies, amounts and exchange rates.
//!
//! Every value carries its currency and every operation between two values
//! checks the currencies at the boundary, returning a typed error instead of
//! coercing. Arithmetic is decimal throughout.

mod amount;
pub mod currency;
mod rate;

pub use amount::{AMOUNT_PRECISION, Amount};
pub use currency::{Currency, CurrencyKind};
pub use rate::{ExchangeRate, RATE_PRECISION};
