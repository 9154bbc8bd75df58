//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::path::PathBuf;

use coinbook::market::{Market, RawDepth};
use coinbook::money::currency::{BTC, USD};

pub const DEPTH_JSON: &str = include_str!("../fixtures/depth.json");
pub const DELTAS_JSON: &str = include_str!("../fixtures/deltas.json");

/// Path to the test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Routes `tracing` output through the test harness. Safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn btc_usd() -> Market {
    Market::new("btc_usd", USD, BTC)
}

/// asks 100 x 2, 110 x 3; bids 95 x 4, 90 x 1
pub fn raw_depth() -> RawDepth {
    serde_json::from_str(DEPTH_JSON).expect("Failed to parse depth fixture")
}

/// [`raw_depth`] with asks ascending and bids descending.
pub fn raw_depth_sorted() -> RawDepth {
    let mut depth = raw_depth();
    depth.asks.sort_by(|a, b| a.price.cmp(&b.price));
    depth.bids.sort_by(|a, b| b.price.cmp(&a.price));
    depth
}
