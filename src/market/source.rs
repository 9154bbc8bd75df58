//! Capabilities implemented by exchange adapters.
//!
//! The core never talks to an exchange. Adapters own the HTTP/WebSocket
//! plumbing and expose their data through these traits in already-typed
//! form.

use std::future::Future;

use super::{Depth, Market, Order, Ticker, Trade};
use crate::Result;

/// Read-only market data for one [`Market`].
pub trait MarketData {
    /// The market this source describes.
    fn market(&self) -> &Market;

    /// Current order book.
    fn fetch_depth(&self) -> impl Future<Output = Result<Depth>> + Send;

    /// Most recent ticker.
    fn fetch_ticker(&self) -> impl Future<Output = Result<Ticker>> + Send;

    /// Recently completed trades.
    fn fetch_trades(&self) -> impl Future<Output = Result<Vec<Trade>>> + Send;
}

/// A participant under user control that can place and cancel orders.
///
/// Failures specific to order management are reported as
/// [`ParticipantError`](crate::ParticipantError) wrapped in
/// [`CoinbookError::Participant`](crate::CoinbookError::Participant); the
/// core propagates them unchanged.
pub trait ActiveParticipant {
    /// Places `order`, returning it with its exchange-side id set.
    fn place_order(&self, order: Order) -> impl Future<Output = Result<Order>> + Send;

    /// Cancels a previously placed order.
    fn cancel_order(&self, order: &Order) -> impl Future<Output = Result<()>> + Send;

    fn list_open_orders(&self) -> impl Future<Output = Result<Vec<Order>>> + Send;
}
