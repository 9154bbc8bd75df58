//! Configuration loading tests.

mod common;

use std::io::Write;

use rust_decimal_macros::dec;

use coinbook::CoinbookError;
use coinbook::config::AppConfig;
use coinbook::feed::DeltaFeed;
use coinbook::simulation::OrderSimulator;

#[test]
fn test_fixture_config_loads() {
    let config = AppConfig::load(&common::fixtures_dir().join("config.json"))
        .expect("Failed to load fixture config");

    assert_eq!(config.feed.capacity, 64);
    assert_eq!(config.simulation.market_buy_ceiling, dec!(1000000));
    assert_eq!(config.simulation.market_sell_floor, dec!(0.0001));

    // Both halves are usable as-is.
    let _feed = DeltaFeed::new(&config.feed);
    let _simulator = OrderSimulator::new(config.simulation);
}

#[test]
fn test_partial_file_takes_defaults() {
    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    write!(file, r#"{{"simulation":{{"market_sell_floor":"0.5"}}}}"#).unwrap();

    let config = AppConfig::load(file.path()).expect("Failed to load config");
    assert_eq!(config.feed, AppConfig::default().feed);
    assert_eq!(config.simulation.market_sell_floor, dec!(0.5));
}

#[test]
fn test_config_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = AppConfig::load(&dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, CoinbookError::Config(_)));
}

#[test]
fn test_malformed_json_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();
    let err = AppConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, CoinbookError::Json(_)));
}

#[test]
fn test_out_of_range_file_values_are_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"feed":{{"capacity":0}}}}"#).unwrap();
    let err = AppConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, CoinbookError::Config(_)));
}
