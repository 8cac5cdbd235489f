//! Fog-of-war perception
//!
//! The drone sees a square window of Chebyshev radius `range` around itself.
//! Everything inside the window becomes *discovered*; every burning cell in it
//! that has not been reported yet is reported exactly once.
//!
//! Discovery and reporting are tracked separately: a cell first seen clear may
//! ignite later and must then be reported when the drone sees it again.

use crate::grid::{CellMask, DiscoveryMask, GridWorld, Position};
use crate::report::{DiscoveredFireEvent, Reporter};
use tracing::{trace, warn};

/// What the drone knows about the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyKnowledge {
    discovered: DiscoveryMask,
    reported: CellMask,
}

impl SurveyKnowledge {
    /// Nothing discovered, nothing reported
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            discovered: CellMask::new(rows, cols),
            reported: CellMask::new(rows, cols),
        }
    }

    /// Empty knowledge shaped like `grid`
    pub fn for_grid(grid: &GridWorld) -> Self {
        Self::new(grid.rows(), grid.cols())
    }

    /// Cells observed at least once
    pub fn discovered(&self) -> &DiscoveryMask {
        &self.discovered
    }

    /// Cells already reported as burning
    pub fn reported(&self) -> &CellMask {
        &self.reported
    }

    /// Whether `pos` has been observed
    pub fn is_discovered(&self, pos: Position) -> bool {
        self.discovered.get(pos)
    }

    /// Whether `pos` has been reported as burning
    pub fn is_reported(&self, pos: Position) -> bool {
        self.reported.get(pos)
    }

    /// Fraction of cells observed, in `[0, 1]`
    pub fn coverage(&self) -> f64 {
        let total = self.discovered.rows() * self.discovered.cols();
        if total == 0 {
            return 0.0;
        }
        self.discovered.count() as f64 / total as f64
    }
}

/// Counters from a single [`reveal`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevealSummary {
    /// Cells observed for the first time
    pub newly_discovered: usize,
    /// Burning cells handed to the reporter
    pub fires_reported: usize,
    /// Reports the reporter refused
    pub report_failures: usize,
}

impl RevealSummary {
    /// Whether the call taught the drone anything
    pub fn made_progress(&self) -> bool {
        self.newly_discovered > 0 || self.fires_reported > 0
    }
}

/// Observe the window around `center` and report newly seen fires.
///
/// The cell is marked reported after the reporter was called, whether or not
/// delivery succeeded. Calling this twice with the same arguments changes
/// nothing the second time.
pub fn reveal<R: Reporter + ?Sized>(
    grid: &GridWorld,
    knowledge: &mut SurveyKnowledge,
    center: Position,
    range: usize,
    step: u64,
    reporter: &mut R,
) -> RevealSummary {
    let mut summary = RevealSummary::default();
    if !grid.contains(center) {
        return summary;
    }

    let row_end = center.row.saturating_add(range).min(grid.rows() - 1);
    let col_end = center.col.saturating_add(range).min(grid.cols() - 1);

    for row in center.row.saturating_sub(range)..=row_end {
        for col in center.col.saturating_sub(range)..=col_end {
            let pos = Position::new(row, col);
            if knowledge.discovered.mark(pos) {
                summary.newly_discovered += 1;
            }

            if !grid.is_fire(pos) || knowledge.reported.get(pos) {
                continue;
            }

            let event = DiscoveredFireEvent {
                position: pos,
                step,
            };
            if let Err(e) = reporter.report_fire(&event) {
                warn!("Failed to report fire at {}: {}", pos, e);
                summary.report_failures += 1;
            }
            knowledge.reported.mark(pos);
            summary.fires_reported += 1;
        }
    }

    trace!(
        "Reveal around {} (range {}): {} new cells, {} fires reported",
        center,
        range,
        summary.newly_discovered,
        summary.fires_reported
    );
    summary
}
