//! Fire Scout Core Library
//!
//! A single drone surveys a grid-shaped area while a wildfire spreads across
//! it. The drone only knows what it has seen, reports every burning cell it
//! discovers exactly once, and re-plans whenever fire blocks its route.
//!
//! ## Layout
//!
//! - [`grid`]: ground-truth world, cell geometry and per-cell masks
//! - [`pathfinding`]: shortest paths around burning cells (BFS or A*)
//! - [`perception`]: fog-of-war reveal and fire reporting
//! - [`mission`]: configuration, target policies and the coverage controller
//! - [`report`]: reporter sinks, wire codec and world handoff
//!
//! ## Example
//!
//! ```
//! use fire_scout_core::{CoverageController, GridWorld, MissionConfig, RecordingReporter};
//!
//! let mut grid = GridWorld::seeded(10, 10, 42).unwrap();
//! grid.populate_random_fires(10).unwrap();
//! let mut config = MissionConfig::default();
//! config.start = grid.positions().find(|p| !grid.is_fire(*p)).unwrap();
//!
//! let mut controller = CoverageController::new(grid, config, RecordingReporter::new()).unwrap();
//! let summary = controller.run();
//! assert!(summary.steps > 0 || summary.cells_discovered > 0);
//! ```

pub mod error;
pub mod grid;
pub mod mission;
pub mod pathfinding;
pub mod perception;
pub mod report;

// Re-export main types
pub use error::{ReportError, ScoutError, WireError};
pub use grid::{CellMask, CellState, Connectivity, DiscoveryMask, GridWorld, Position};
pub use mission::{
    CoverageController, MissionConfig, MissionOutcome, MissionSnapshot, MissionState,
    MissionSummary, ScoutConfig, TargetPolicy, VisitOutcome, WorldConfig,
};
pub use pathfinding::{Path, PathOutcome, Pathfinder, SearchStrategy};
pub use perception::{reveal, RevealSummary, SurveyKnowledge};
pub use report::{
    ChannelReporter, DiscoveredFireEvent, LogReporter, RecordingReporter, Reporter,
    StreamReporter, TcpReporter, WireFormat,
};
