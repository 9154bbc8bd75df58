//! Order and market model.
//!
//! Typed wrappers for the data exchange adapters supply: orders, trades,
//! depth and tickers, plus the [`Market`] descriptor they all belong to.

pub mod depth;
mod descriptor;
mod order;
mod source;
mod ticker;

pub use depth::{Depth, PriceLevel, RawDepth, unit_price_in};
pub use descriptor::Market;
pub use order::{Order, OrderKind, Trade};
pub use source::{ActiveParticipant, MarketData};
pub use ticker::{Ticker, TickerBuilder};
