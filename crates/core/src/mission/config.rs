//! Run parameters for the world and the drone
//!
//! All types deserialize with defaults for missing fields, so a partial TOML
//! file only needs to name what it changes:
//!
//! ```toml
//! [world]
//! rows = 20
//! cols = 30
//! seed = 7
//!
//! [mission]
//! perception_range = 1
//! policy = "greedy-fire-first"
//! ```

use super::state::TargetPolicy;
use crate::error::ScoutError;
use crate::grid::{Connectivity, GridWorld, Position, DEFAULT_SPREAD_PROBABILITY};
use crate::pathfinding::{Pathfinder, SearchStrategy};
use serde::{Deserialize, Serialize};
use tracing::info;

/// How the ground-truth grid is generated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Grid rows
    pub rows: usize,
    /// Grid columns
    pub cols: usize,
    /// Chance (0-100) that each cell starts burning
    pub ignition_percent: u8,
    /// Per-neighbour ignition probability for each spread tick
    pub spread_probability: f64,
    /// Random seed; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            rows: 15,
            cols: 15,
            ignition_percent: 10,
            spread_probability: DEFAULT_SPREAD_PROBABILITY,
            seed: None,
        }
    }
}

impl WorldConfig {
    /// Check every field
    ///
    /// # Errors
    /// Returns the first invalid field as a [`ScoutError`].
    pub fn validate(&self) -> Result<(), ScoutError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ScoutError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.ignition_percent > 100 {
            return Err(ScoutError::InvalidProbability {
                name: "ignition_percent",
                range: "[0, 100]",
                value: f64::from(self.ignition_percent),
            });
        }
        if !(0.0..=1.0).contains(&self.spread_probability) {
            return Err(ScoutError::InvalidProbability {
                name: "spread_probability",
                range: "[0, 1]",
                value: self.spread_probability,
            });
        }
        Ok(())
    }

    /// Build and populate a grid from this configuration
    ///
    /// # Errors
    /// Returns a [`ScoutError`] if the configuration is invalid.
    pub fn build(&self) -> Result<GridWorld, ScoutError> {
        self.validate()?;
        let grid = match self.seed {
            Some(seed) => GridWorld::seeded(self.rows, self.cols, seed)?,
            None => GridWorld::new(self.rows, self.cols)?,
        };
        let mut grid = grid.with_spread_probability(self.spread_probability)?;
        let fires = grid.populate_random_fires(self.ignition_percent)?;

        info!(
            "Generated {}x{} world with {} burning cells (seed {:?})",
            self.rows, self.cols, fires, self.seed
        );
        Ok(grid)
    }
}

/// How the drone flies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    /// Take-off cell
    pub start: Position,
    /// Chebyshev radius of the sensor window
    pub perception_range: usize,
    /// The fire spreads once every this many drone steps
    pub spread_interval: u32,
    /// Target selection policy
    pub policy: TargetPolicy,
    /// Movement model
    pub connectivity: Connectivity,
    /// Path search algorithm
    pub search: SearchStrategy,
    /// Hard cap on committed steps
    pub max_steps: Option<u64>,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            start: Position::new(0, 0),
            perception_range: 2,
            spread_interval: 5,
            policy: TargetPolicy::Boustrophedon,
            connectivity: Connectivity::Eight,
            search: SearchStrategy::BreadthFirst,
            max_steps: None,
        }
    }
}

impl MissionConfig {
    /// Check fields that do not depend on the grid
    ///
    /// # Errors
    /// Returns [`ScoutError::InvalidConfig`] if `spread_interval` is zero.
    pub fn validate(&self) -> Result<(), ScoutError> {
        if self.spread_interval == 0 {
            return Err(ScoutError::InvalidConfig(
                "spread_interval must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Pathfinder matching this configuration
    pub fn pathfinder(&self) -> Pathfinder {
        Pathfinder::new(self.connectivity).with_strategy(self.search)
    }
}

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoutConfig {
    /// World generation
    pub world: WorldConfig,
    /// Drone behaviour
    pub mission: MissionConfig,
}

impl ScoutConfig {
    /// Check both sections, including that the start lies on the grid
    ///
    /// # Errors
    /// Returns the first problem found as a [`ScoutError`].
    pub fn validate(&self) -> Result<(), ScoutError> {
        self.world.validate()?;
        self.mission.validate()?;
        let start = self.mission.start;
        if start.row >= self.world.rows || start.col >= self.world.cols {
            return Err(ScoutError::OutOfBounds {
                position: start,
                rows: self.world.rows,
                cols: self.world.cols,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ScoutConfig::default().validate().is_ok());
        let mission = MissionConfig::default();
        assert_eq!(mission.perception_range, 2);
        assert_eq!(mission.spread_interval, 5);
        assert_eq!(WorldConfig::default().ignition_percent, 10);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = ScoutConfig::default();
        config.world.rows = 0;
        assert!(matches!(
            config.validate(),
            Err(ScoutError::InvalidDimensions { .. })
        ));

        let mut config = ScoutConfig::default();
        config.world.spread_probability = 2.0;
        assert!(matches!(
            config.validate(),
            Err(ScoutError::InvalidProbability { .. })
        ));

        let mut config = ScoutConfig::default();
        config.mission.spread_interval = 0;
        assert!(matches!(
            config.validate(),
            Err(ScoutError::InvalidConfig(_))
        ));

        let mut config = ScoutConfig::default();
        config.mission.start = Position::new(15, 0);
        assert!(matches!(
            config.validate(),
            Err(ScoutError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_build_is_reproducible_with_seed() {
        let config = WorldConfig {
            rows: 12,
            cols: 9,
            ignition_percent: 25,
            seed: Some(11),
            ..WorldConfig::default()
        };
        let a = config.build().unwrap();
        let b = config.build().unwrap();
        assert_eq!(a.cells(), b.cells());
        assert_eq!(a.spread_probability(), DEFAULT_SPREAD_PROBABILITY);
    }

    #[test]
    fn test_pathfinder_follows_config() {
        let config = MissionConfig {
            connectivity: Connectivity::Four,
            search: SearchStrategy::AStar,
            ..MissionConfig::default()
        };
        let finder = config.pathfinder();
        assert_eq!(finder.connectivity(), Connectivity::Four);
        assert_eq!(finder.strategy(), SearchStrategy::AStar);
    }
}
