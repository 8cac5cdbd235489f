//! Cell states, grid positions and neighbourhood geometry

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ground-truth state of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellState {
    /// Nothing burning; the drone may fly over it
    #[default]
    Clear,
    /// Burning; blocks movement and never extinguishes
    Fire,
}

impl CellState {
    /// Whether this cell is on fire
    #[must_use]
    pub fn is_fire(self) -> bool {
        matches!(self, Self::Fire)
    }
}

/// A `(row, col)` cell coordinate, 0-indexed from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Row index
    pub row: usize,
    /// Column index
    pub col: usize,
}

impl Position {
    /// Create a new position
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Shift by a signed offset, `None` if either coordinate would go negative
    #[must_use]
    pub fn offset(self, dr: isize, dc: isize) -> Option<Self> {
        Some(Self {
            row: self.row.checked_add_signed(dr)?,
            col: self.col.checked_add_signed(dc)?,
        })
    }

    /// Chebyshev distance: minimum step count under 8-connected movement
    #[must_use]
    pub fn chebyshev(self, other: Self) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }

    /// Manhattan distance: minimum step count under 4-connected movement
    #[must_use]
    pub fn manhattan(self, other: Self) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

/// Neighbour offsets as `(dr, dc)` in fixed expansion order:
/// S, N, E, W, SE, SW, NE, NW.
///
/// The first four are the orthogonal moves. Search order over this table is
/// what makes tie-breaking between equal-length paths reproducible.
pub const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Movement model used by the pathfinder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Connectivity {
    /// Orthogonal moves only
    Four,
    /// Orthogonal and diagonal moves
    #[default]
    Eight,
}

impl Connectivity {
    /// Offsets reachable in one step, in expansion order
    #[must_use]
    pub fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            Self::Four => &NEIGHBOR_OFFSETS[..4],
            Self::Eight => &NEIGHBOR_OFFSETS,
        }
    }

    /// Minimum step count between two cells on an obstacle-free grid.
    ///
    /// Admissible and consistent as an A* heuristic for unit step cost.
    #[must_use]
    pub fn distance(self, a: Position, b: Position) -> usize {
        match self {
            Self::Four => a.manhattan(b),
            Self::Eight => a.chebyshev(b),
        }
    }

    /// Whether `b` is one step away from `a`
    #[must_use]
    pub fn is_adjacent(self, a: Position, b: Position) -> bool {
        match self {
            Self::Four => a.manhattan(b) == 1,
            Self::Eight => a.chebyshev(b) == 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_rejects_negative() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.offset(-1, 0), None);
        assert_eq!(origin.offset(0, -1), None);
        assert_eq!(origin.offset(1, 1), Some(Position::new(1, 1)));
    }

    #[test]
    fn test_distances() {
        let a = Position::new(1, 1);
        let b = Position::new(4, 3);
        assert_eq!(a.chebyshev(b), 3);
        assert_eq!(a.manhattan(b), 5);
        assert_eq!(Connectivity::Eight.distance(a, b), 3);
        assert_eq!(Connectivity::Four.distance(a, b), 5);
    }

    #[test]
    fn test_connectivity_offsets() {
        assert_eq!(Connectivity::Four.offsets().len(), 4);
        assert_eq!(Connectivity::Eight.offsets().len(), 8);
        // Orthogonal moves always come first
        for &(dr, dc) in Connectivity::Four.offsets() {
            assert_eq!(dr.abs() + dc.abs(), 1);
        }
    }

    #[test]
    fn test_adjacency() {
        let a = Position::new(2, 2);
        assert!(Connectivity::Eight.is_adjacent(a, Position::new(3, 3)));
        assert!(!Connectivity::Four.is_adjacent(a, Position::new(3, 3)));
        assert!(Connectivity::Four.is_adjacent(a, Position::new(2, 1)));
        assert!(!Connectivity::Eight.is_adjacent(a, a));
    }
}
