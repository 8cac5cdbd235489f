//! Shared helpers for the integration tests

#![allow(dead_code)]

use fire_scout_core::{MissionConfig, Position};
use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Mission config starting at `start` with no spread during the test
pub fn still_air(start: Position, range: usize) -> MissionConfig {
    MissionConfig {
        start,
        perception_range: range,
        spread_interval: u32::MAX,
        ..MissionConfig::default()
    }
}
