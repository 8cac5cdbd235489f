//! Monotonic per-cell flags

use super::cell::Position;

/// A grid-shaped set of boolean flags that can only ever be raised
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellMask {
    rows: usize,
    cols: usize,
    bits: Vec<bool>,
    set_count: usize,
}

/// Which cells the drone has observed at least once
pub type DiscoveryMask = CellMask;

impl CellMask {
    /// Create a mask with every flag lowered
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            bits: vec![false; rows * cols],
            set_count: 0,
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether the flag at `pos` is raised. Out-of-bounds reads as lowered.
    pub fn get(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols && self.bits[pos.row * self.cols + pos.col]
    }

    /// Raise the flag at `pos`. Returns `true` if it was newly raised.
    ///
    /// Out-of-bounds positions are ignored and return `false`.
    pub fn mark(&mut self, pos: Position) -> bool {
        if pos.row >= self.rows || pos.col >= self.cols {
            return false;
        }
        let bit = &mut self.bits[pos.row * self.cols + pos.col];
        if *bit {
            return false;
        }
        *bit = true;
        self.set_count += 1;
        true
    }

    /// Number of raised flags
    pub fn count(&self) -> usize {
        self.set_count
    }

    /// Whether every flag is raised
    pub fn is_full(&self) -> bool {
        self.set_count == self.bits.len()
    }

    /// Positions with a lowered flag, in row-major order
    pub fn unset_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter(|&(_, &bit)| !bit)
            .map(|(idx, _)| Position::new(idx / self.cols, idx % self.cols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_is_monotonic() {
        let mut mask = CellMask::new(2, 3);
        let pos = Position::new(1, 2);
        assert!(!mask.get(pos));
        assert!(mask.mark(pos));
        assert!(mask.get(pos));
        assert!(!mask.mark(pos));
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn test_out_of_bounds_is_ignored() {
        let mut mask = CellMask::new(2, 2);
        assert!(!mask.mark(Position::new(2, 0)));
        assert!(!mask.get(Position::new(5, 5)));
        assert_eq!(mask.count(), 0);
    }

    #[test]
    fn test_full_and_unset() {
        let mut mask = CellMask::new(1, 3);
        mask.mark(Position::new(0, 1));
        let unset: Vec<_> = mask.unset_positions().collect();
        assert_eq!(unset, vec![Position::new(0, 0), Position::new(0, 2)]);
        mask.mark(Position::new(0, 0));
        mask.mark(Position::new(0, 2));
        assert!(mask.is_full());
    }
}
