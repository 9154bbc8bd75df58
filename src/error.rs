//! Crate-level error types.
//!
//! [`CoinbookError`] unifies every failure of the monetary algebra, the
//! order model, the simulator and configuration loading behind a single
//! enum so callers can match on the variant they care about while still
//! using the `?` operator for easy propagation.

use crate::money::Currency;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CoinbookError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum CoinbookError {
    /// Arithmetic or comparison between values of different currencies.
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: Currency, right: Currency },

    /// A currency that does not belong to an exchange rate's pair.
    #[error("exchange rate {rate} cannot handle {currency}")]
    BadCurrency { rate: String, currency: Currency },

    /// Two exchange rates that do not share exactly one currency.
    #[error("cannot compose {left} with {right}: they must share exactly one currency")]
    IncompatibleRates { left: String, right: String },

    /// An exchange rate violating `base != quote` or `rate > 0`.
    #[error("invalid exchange rate: {0}")]
    InvalidRate(String),

    /// A decimal result outside the representable range.
    #[error("arithmetic overflow: {0}")]
    Overflow(String),

    /// An aggregator's delta channel overflowed and deltas were skipped.
    #[error("depth feed lagged, {skipped} deltas skipped; resnapshot required")]
    FeedLagged { skipped: u64 },

    /// An order that is malformed or does not fit its market.
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// A ticker whose fields are inconsistent (e.g. `buy > sell`).
    #[error("invalid ticker: {0}")]
    InvalidTicker(String),

    /// A currency code missing from the registry.
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),

    /// Failure reported by an order-placement collaborator.
    #[error(transparent)]
    Participant(#[from] ParticipantError),

    /// A configuration value could not be read or is out of range.
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced by an [`ActiveParticipant`](crate::market::ActiveParticipant).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParticipantError {
    /// The order was already filled or cancelled.
    #[error("order {order_id} is already closed")]
    AlreadyClosed { order_id: String },

    /// The credentials do not allow the requested operation.
    #[error("not authorized: {0}")]
    NotAuthorized(String),
}
