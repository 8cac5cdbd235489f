//! Ground-truth wildfire grid
//!
//! [`GridWorld`] owns the true state of every cell together with the random
//! source used to seed and spread the fire. The drone never reads it directly
//! for planning decisions beyond obstacle checks; what the drone *knows* lives
//! in [`SurveyKnowledge`](crate::perception::SurveyKnowledge).
//!
//! # Spread model
//!
//! Each tick every clear cell with at least one burning 8-neighbour rolls one
//! Bernoulli trial per burning neighbour and ignites if any trial succeeds.
//! Decisions are made against a snapshot of the pre-tick state, so a cell
//! ignited during a tick cannot spread further within that same tick.

use super::cell::{CellState, Position, NEIGHBOR_OFFSETS};
use crate::error::ScoutError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Default per-neighbour ignition probability for one spread tick
pub const DEFAULT_SPREAD_PROBABILITY: f64 = 0.02;

/// Rectangular grid of clear / burning cells with an owned random source
#[derive(Debug, Clone)]
pub struct GridWorld {
    rows: usize,
    cols: usize,
    /// Cells in row-major order: `[row * cols + col]`
    cells: Vec<CellState>,
    spread_probability: f64,
    rng: StdRng,
}

impl GridWorld {
    /// Create an all-clear grid seeded from OS entropy
    ///
    /// # Errors
    /// Returns [`ScoutError::InvalidDimensions`] if either dimension is zero.
    pub fn new(rows: usize, cols: usize) -> Result<Self, ScoutError> {
        Self::with_rng(rows, cols, StdRng::from_os_rng())
    }

    /// Create an all-clear grid with a deterministic seed
    ///
    /// # Errors
    /// Returns [`ScoutError::InvalidDimensions`] if either dimension is zero.
    pub fn seeded(rows: usize, cols: usize, seed: u64) -> Result<Self, ScoutError> {
        Self::with_rng(rows, cols, StdRng::seed_from_u64(seed))
    }

    /// Create an all-clear grid that draws from the given random source
    ///
    /// # Errors
    /// Returns [`ScoutError::InvalidDimensions`] if either dimension is zero.
    pub fn with_rng(rows: usize, cols: usize, rng: StdRng) -> Result<Self, ScoutError> {
        Self::from_cells(rows, cols, vec![CellState::Clear; rows * cols], rng)
    }

    /// Create a grid from explicit row-major cells
    ///
    /// # Errors
    /// Returns [`ScoutError::InvalidDimensions`] if either dimension is zero, or
    /// [`ScoutError::InvalidConfig`] if `cells` does not hold `rows * cols` entries.
    pub fn from_cells(
        rows: usize,
        cols: usize,
        cells: Vec<CellState>,
        rng: StdRng,
    ) -> Result<Self, ScoutError> {
        if rows == 0 || cols == 0 {
            return Err(ScoutError::InvalidDimensions { rows, cols });
        }
        if cells.len() != rows * cols {
            return Err(ScoutError::InvalidConfig(format!(
                "expected {} cells for a {rows}x{cols} grid, got {}",
                rows * cols,
                cells.len()
            )));
        }

        Ok(Self {
            rows,
            cols,
            cells,
            spread_probability: DEFAULT_SPREAD_PROBABILITY,
            rng,
        })
    }

    /// Build a grid from a text layout, one line per row.
    ///
    /// `X` marks a burning cell, `.` a clear one. Surrounding whitespace on
    /// each line is ignored and blank lines are skipped.
    ///
    /// ```
    /// use fire_scout_core::{GridWorld, Position};
    ///
    /// let grid = GridWorld::from_layout("..X\n...", 7).unwrap();
    /// assert_eq!((grid.rows(), grid.cols()), (2, 3));
    /// assert!(grid.is_fire(Position::new(0, 2)));
    /// ```
    ///
    /// # Errors
    /// Returns [`ScoutError::InvalidConfig`] for ragged rows or unknown
    /// characters, and [`ScoutError::InvalidDimensions`] for an empty layout.
    pub fn from_layout(layout: &str, seed: u64) -> Result<Self, ScoutError> {
        let lines: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let rows = lines.len();
        let cols = lines.first().map_or(0, |line| line.chars().count());

        let mut cells = Vec::with_capacity(rows * cols);
        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != cols {
                return Err(ScoutError::InvalidConfig(format!(
                    "layout row {row} has {} cells, expected {cols}",
                    line.chars().count()
                )));
            }
            for ch in line.chars() {
                cells.push(match ch {
                    '.' => CellState::Clear,
                    'X' => CellState::Fire,
                    other => {
                        return Err(ScoutError::InvalidConfig(format!(
                            "unknown layout character {other:?} in row {row}"
                        )))
                    }
                });
            }
        }

        Self::from_cells(rows, cols, cells, StdRng::seed_from_u64(seed))
    }

    /// Set the per-neighbour ignition probability used by [`Self::spread_fires`]
    ///
    /// # Errors
    /// Returns [`ScoutError::InvalidProbability`] unless `0.0 <= p <= 1.0`.
    pub fn with_spread_probability(mut self, probability: f64) -> Result<Self, ScoutError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(ScoutError::InvalidProbability {
                name: "spread_probability",
                range: "[0, 1]",
                value: probability,
            });
        }
        self.spread_probability = probability;
        Ok(self)
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Per-neighbour ignition probability
    pub fn spread_probability(&self) -> f64 {
        self.spread_probability
    }

    /// Row-major view of every cell
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// Whether `pos` lies inside the grid
    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Reject positions outside the grid
    ///
    /// # Errors
    /// Returns [`ScoutError::OutOfBounds`] if `pos` is not inside the grid.
    pub fn check_bounds(&self, pos: Position) -> Result<(), ScoutError> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(ScoutError::OutOfBounds {
                position: pos,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Row-major index of an in-bounds position
    #[inline]
    pub(crate) fn index(&self, pos: Position) -> usize {
        pos.row * self.cols + pos.col
    }

    /// Position of a row-major index
    #[inline]
    pub(crate) fn position_of(&self, index: usize) -> Position {
        Position::new(index / self.cols, index % self.cols)
    }

    /// State of the cell at `pos`
    ///
    /// # Errors
    /// Returns [`ScoutError::OutOfBounds`] if `pos` is not inside the grid.
    pub fn cell_state(&self, pos: Position) -> Result<CellState, ScoutError> {
        self.check_bounds(pos)?;
        Ok(self.cells[self.index(pos)])
    }

    /// Whether `pos` is inside the grid and burning
    pub fn is_fire(&self, pos: Position) -> bool {
        self.contains(pos) && self.cells[self.index(pos)].is_fire()
    }

    /// Whether `pos` is inside the grid and clear
    pub fn is_passable(&self, pos: Position) -> bool {
        self.contains(pos) && !self.cells[self.index(pos)].is_fire()
    }

    /// In-bounds neighbours of `pos` under the given offsets, in offset order
    pub(crate) fn neighbors<'a>(
        &'a self,
        pos: Position,
        offsets: &'a [(isize, isize)],
    ) -> impl Iterator<Item = Position> + 'a {
        offsets
            .iter()
            .filter_map(move |&(dr, dc)| pos.offset(dr, dc))
            .filter(move |n| self.contains(*n))
    }

    /// Set a single cell on fire. Returns `true` if it was clear before.
    ///
    /// # Errors
    /// Returns [`ScoutError::OutOfBounds`] if `pos` is not inside the grid.
    pub fn ignite(&mut self, pos: Position) -> Result<bool, ScoutError> {
        self.check_bounds(pos)?;
        let idx = self.index(pos);
        let was_clear = !self.cells[idx].is_fire();
        self.cells[idx] = CellState::Fire;
        Ok(was_clear)
    }

    /// Ignite each cell independently with probability `percent / 100`.
    ///
    /// Returns the number of cells ignited by this call.
    ///
    /// # Errors
    /// Returns [`ScoutError::InvalidProbability`] if `percent > 100`.
    pub fn populate_random_fires(&mut self, percent: u8) -> Result<usize, ScoutError> {
        if percent > 100 {
            return Err(ScoutError::InvalidProbability {
                name: "ignition_percent",
                range: "[0, 100]",
                value: f64::from(percent),
            });
        }

        let mut ignited = 0;
        for cell in &mut self.cells {
            // Uniform draw in 0..100: 0% never ignites, 100% always does
            if self.rng.random_range(0..100u8) < percent && !cell.is_fire() {
                *cell = CellState::Fire;
                ignited += 1;
            }
        }

        debug!(
            "Populated {} random fires on {}x{} grid ({}% chance)",
            ignited, self.rows, self.cols, percent
        );
        Ok(ignited)
    }

    /// Advance the fire by one tick. Returns the number of newly burning cells.
    pub fn spread_fires(&mut self) -> usize {
        let snapshot = self.cells.clone();
        let probability = self.spread_probability;
        let mut ignited = 0;

        for idx in 0..snapshot.len() {
            if snapshot[idx].is_fire() {
                continue;
            }

            let pos = self.position_of(idx);
            let burning_neighbors = self
                .neighbors(pos, &NEIGHBOR_OFFSETS)
                .filter(|n| snapshot[self.index(*n)].is_fire())
                .count();
            if burning_neighbors == 0 {
                continue;
            }

            if (0..burning_neighbors).any(|_| self.rng.random_bool(probability)) {
                self.cells[idx] = CellState::Fire;
                ignited += 1;
            }
        }

        debug!(
            "Fire spread tick: {} new cells burning, {} total",
            ignited,
            self.fire_count()
        );
        ignited
    }

    /// Number of burning cells
    pub fn fire_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_fire()).count()
    }

    /// Every position in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells.len()).map(|idx| self.position_of(idx))
    }
}
