//! Unit tests for stream configuration defaults

use portal_loadtest::stream::config::{RANGE_SIZE, REPORTED_BLOCKS};
use portal_loadtest::stream::StreamConfig;

#[test]
fn test_production_constants() {
    assert_eq!(RANGE_SIZE, 500_000);
    // The reported numerator is intentionally not the range size; both are
    // pinned here so neither drifts unnoticed.
    assert_eq!(REPORTED_BLOCKS, 100_000);
}

#[test]
fn test_default_config_matches_constants() {
    let config = StreamConfig::default();
    assert_eq!(config.range_size, RANGE_SIZE);
    assert_eq!(config.reported_blocks, REPORTED_BLOCKS);
    assert_eq!(config.max_restarts, None);
}
