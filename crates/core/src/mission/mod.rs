//! Coverage mission: configuration, target policies and the controller

pub mod config;
pub mod controller;
pub mod state;
pub mod targets;

pub use config::{MissionConfig, ScoutConfig, WorldConfig};
pub use controller::{CoverageController, MissionSnapshot};
pub use state::{MissionOutcome, MissionState, MissionSummary, TargetPolicy, VisitOutcome};
pub use targets::{greedy_fire_first, BoustrophedonScan};
