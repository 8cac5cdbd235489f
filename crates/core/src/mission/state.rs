//! Mission state machine states, outcomes and summary

use crate::grid::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the controller picks the next cell to fly to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetPolicy {
    /// Serpentine row scan: even rows left to right, odd rows right to left
    #[default]
    Boustrophedon,
    /// Head for the fire front first, then sweep what is left in row-major order
    GreedyFireFirst,
}

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionState {
    /// Not started yet
    Idle,
    /// Choosing the next target
    Scanning,
    /// Walking a planned path
    Stepping {
        /// Cell being flown to
        target: Position,
    },
    /// The next cell on the path caught fire; planning a fresh route
    Replanning {
        /// Cell being flown to
        target: Position,
    },
    /// Every reachable cell has been observed
    Done,
    /// No further progress is possible
    SignalLost,
    /// The configured step cap was hit
    StepLimitReached,
}

impl MissionState {
    /// Is this a terminal state?
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Done | Self::SignalLost | Self::StepLimitReached
        )
    }

    /// State name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Scanning => "Scanning",
            Self::Stepping { .. } => "Stepping",
            Self::Replanning { .. } => "Replanning",
            Self::Done => "Done",
            Self::SignalLost => "SignalLost",
            Self::StepLimitReached => "StepLimitReached",
        }
    }

    /// How the mission ended, or `None` while it is still running
    pub fn outcome(&self) -> Option<MissionOutcome> {
        match self {
            Self::Done => Some(MissionOutcome::Done),
            Self::SignalLost => Some(MissionOutcome::SignalLost),
            Self::StepLimitReached => Some(MissionOutcome::StepLimitReached),
            Self::Idle | Self::Scanning | Self::Stepping { .. } | Self::Replanning { .. } => None,
        }
    }
}

impl From<MissionOutcome> for MissionState {
    fn from(outcome: MissionOutcome) -> Self {
        match outcome {
            MissionOutcome::Done => Self::Done,
            MissionOutcome::SignalLost => Self::SignalLost,
            MissionOutcome::StepLimitReached => Self::StepLimitReached,
        }
    }
}

/// How a mission ended. None of these are errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionOutcome {
    /// All reachable cells discovered or confirmed unreachable
    Done,
    /// The drone is boxed in with cells it can never reach
    SignalLost,
    /// Stopped by the step cap
    StepLimitReached,
}

impl MissionOutcome {
    /// Whether the survey finished normally
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Done)
    }

    /// Human-readable status line
    pub fn describe(self) -> &'static str {
        match self {
            Self::Done => "mission complete",
            Self::SignalLost => "mission aborted: signal lost",
            Self::StepLimitReached => "mission aborted: step limit reached",
        }
    }
}

impl fmt::Display for MissionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Result of flying to a single target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    /// The drone arrived at the target
    Reached,
    /// The target cannot be reached but other cells still can
    Skipped,
    /// Nothing undiscovered is reachable any more
    SignalLost,
    /// The step cap was hit on the way
    StepLimitReached,
}

/// End-of-mission statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionSummary {
    /// How the mission ended; `None` while it is still running
    pub outcome: Option<MissionOutcome>,
    /// Moves committed
    pub steps: u64,
    /// Fire spread ticks applied
    pub spread_ticks: u64,
    /// Targets chosen by the policy (plus caller-supplied visits)
    pub targets_selected: u64,
    /// Routes re-planned because the next cell caught fire
    pub replans: u64,
    /// Fires handed to the reporter
    pub fires_reported: u64,
    /// Reports (including the end signal) the reporter refused
    pub report_failures: u64,
    /// Cells observed at least once
    pub cells_discovered: usize,
    /// Cells in the grid
    pub total_cells: usize,
    /// Cells burning in the ground truth at the end
    pub fires_on_grid: usize,
    /// Where the drone stopped
    pub final_position: Position,
}

impl MissionSummary {
    /// Fraction of the grid observed, in `[0, 1]`
    pub fn coverage(&self) -> f64 {
        if self.total_cells == 0 {
            return 0.0;
        }
        self.cells_discovered as f64 / self.total_cells as f64
    }
}

impl fmt::Display for MissionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            Some(outcome) => writeln!(f, "Outcome:          {}", outcome)?,
            None => writeln!(f, "Outcome:          in progress")?,
        }
        writeln!(f, "Steps:            {}", self.steps)?;
        writeln!(f, "Spread ticks:     {}", self.spread_ticks)?;
        writeln!(f, "Targets selected: {}", self.targets_selected)?;
        writeln!(f, "Replans:          {}", self.replans)?;
        writeln!(
            f,
            "Fires reported:   {} ({} burning on grid)",
            self.fires_reported, self.fires_on_grid
        )?;
        writeln!(f, "Report failures:  {}", self.report_failures)?;
        writeln!(
            f,
            "Coverage:         {}/{} cells ({:.1}%)",
            self.cells_discovered,
            self.total_cells,
            self.coverage() * 100.0
        )?;
        write!(f, "Final position:   {}", self.final_position)
    }
}
