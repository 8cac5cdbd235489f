//! Target selection policies

use crate::grid::{Connectivity, GridWorld, Position, NEIGHBOR_OFFSETS};
use crate::pathfinding::reachable_distances;
use crate::perception::SurveyKnowledge;

/// Serpentine scan over a `rows x cols` grid: even rows left to right,
/// odd rows right to left. Every cell is yielded exactly once.
#[derive(Debug, Clone)]
pub struct BoustrophedonScan {
    rows: usize,
    cols: usize,
    next: usize,
}

impl BoustrophedonScan {
    /// Scan starting at the top-left corner
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols, next: 0 }
    }

    /// Scan covering `grid`
    pub fn for_grid(grid: &GridWorld) -> Self {
        Self::new(grid.rows(), grid.cols())
    }
}

impl Iterator for BoustrophedonScan {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if self.cols == 0 || self.next >= self.rows * self.cols {
            return None;
        }
        let row = self.next / self.cols;
        let offset = self.next % self.cols;
        self.next += 1;

        let col = if row % 2 == 0 {
            offset
        } else {
            self.cols - 1 - offset
        };
        Some(Position::new(row, col))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.rows * self.cols).saturating_sub(self.next);
        (left, Some(left))
    }
}

impl ExactSizeIterator for BoustrophedonScan {}

/// Whether any 8-neighbour of `pos` is a fire the drone has already seen
fn borders_known_fire(knowledge: &SurveyKnowledge, pos: Position) -> bool {
    NEIGHBOR_OFFSETS
        .iter()
        .filter_map(|&(dr, dc)| pos.offset(dr, dc))
        .any(|n| knowledge.is_reported(n))
}

/// Pick the next greedy target from `from`.
///
/// Prefers the closest (by path length) undiscovered clear cell that borders a
/// known fire. Without one, falls back to the first reachable undiscovered
/// cell in row-major order. Ties break row-major. `None` means nothing
/// undiscovered is reachable.
pub fn greedy_fire_first(
    grid: &GridWorld,
    knowledge: &SurveyKnowledge,
    from: Position,
    connectivity: Connectivity,
) -> Option<Position> {
    let distances = reachable_distances(grid, from, connectivity);
    let candidates: Vec<(usize, Position)> = knowledge
        .discovered()
        .unset_positions()
        .filter_map(|p| distances.get(p).map(|d| (d, p)))
        .collect();

    let frontier = candidates
        .iter()
        .filter(|&&(_, p)| borders_known_fire(knowledge, p))
        .min_by_key(|&&(d, p)| (d, p));

    frontier.or_else(|| candidates.first()).map(|&(_, p)| p)
}
