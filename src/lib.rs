//! Currency algebra, order-book simulation and depth aggregation for
//! cryptocurrency exchanges.
//!
//! Exchange adapters hand over typed data through the traits in
//! [`market`]; everything monetary goes through the dimension-checked
//! types in [`money`]. [`simulation`] predicts how an order would fill
//! against a depth snapshot and [`feed`] keeps a depth current from a
//! stream of deltas.

pub mod config;
pub mod error;
pub mod feed;
pub mod market;
pub mod money;
pub mod simulation;

pub use error::{CoinbookError, ParticipantError, Result};
