//! Shortest obstacle-avoiding routes over the fire grid
//!
//! Burning cells are obstacles; every move costs one step. Two strategies are
//! available and both return a minimum-step path:
//!
//! - **Breadth-first** search, the reference algorithm.
//! - **A\***, ordered by `steps + heuristic` where the heuristic is the
//!   Chebyshev distance for 8-connected movement and the Manhattan distance for
//!   4-connected movement. Both are admissible and consistent for unit cost.
//!
//! Neighbours are always expanded in [`NEIGHBOR_OFFSETS`](crate::grid::NEIGHBOR_OFFSETS)
//! order so equal-length ties resolve the same way on every run.
//!
//! The start cell is always admitted, even if it has caught fire since the
//! drone arrived there.

use crate::error::ScoutError;
use crate::grid::{CellMask, Connectivity, GridWorld, Position};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};
use tracing::trace;

const NO_PARENT: usize = usize::MAX;

/// Search algorithm used by [`Pathfinder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    /// Uniform breadth-first expansion
    #[default]
    BreadthFirst,
    /// Best-first expansion guided by an admissible distance heuristic
    AStar,
}

/// A non-empty route whose first element is the start cell.
///
/// Consecutive cells are adjacent under the connectivity that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    cells: Vec<Position>,
}

impl Path {
    fn new(cells: Vec<Position>) -> Self {
        debug_assert!(!cells.is_empty());
        Self { cells }
    }

    /// First cell (where the drone currently is)
    pub fn start(&self) -> Position {
        self.cells[0]
    }

    /// Last cell
    pub fn goal(&self) -> Position {
        self.cells[self.cells.len() - 1]
    }

    /// Number of cells, including the start
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; paths hold at least their start cell
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of moves needed to walk the path
    pub fn steps(&self) -> usize {
        self.cells.len() - 1
    }

    /// Every cell in order
    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    /// Cells still to be entered, excluding the start
    pub fn remaining(&self) -> &[Position] {
        &self.cells[1..]
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Position;
    type IntoIter = std::slice::Iter<'a, Position>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

/// Result of a path query; `Unreachable` is an ordinary outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathOutcome {
    /// A minimum-step route exists
    Found(Path),
    /// The goal is burning or walled off by fire
    Unreachable,
}

impl PathOutcome {
    /// The path, if one was found
    pub fn into_path(self) -> Option<Path> {
        match self {
            Self::Found(path) => Some(path),
            Self::Unreachable => None,
        }
    }

    /// Whether no route exists
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable)
    }
}

/// Grid pathfinder with a fixed movement model and search strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pathfinder {
    connectivity: Connectivity,
    strategy: SearchStrategy,
}

impl Pathfinder {
    /// Breadth-first pathfinder with the given connectivity
    pub fn new(connectivity: Connectivity) -> Self {
        Self {
            connectivity,
            strategy: SearchStrategy::BreadthFirst,
        }
    }

    /// Switch the search strategy
    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Movement model
    pub fn connectivity(self) -> Connectivity {
        self.connectivity
    }

    /// Search strategy
    pub fn strategy(self) -> SearchStrategy {
        self.strategy
    }

    /// Find a minimum-step route from `start` to `goal` over clear cells.
    ///
    /// # Errors
    /// Returns [`ScoutError::OutOfBounds`] if either endpoint lies outside the grid.
    pub fn find_path(
        self,
        grid: &GridWorld,
        start: Position,
        goal: Position,
    ) -> Result<PathOutcome, ScoutError> {
        grid.check_bounds(start)?;
        grid.check_bounds(goal)?;

        if grid.is_fire(goal) {
            trace!("Goal {} is burning, unreachable", goal);
            return Ok(PathOutcome::Unreachable);
        }
        if start == goal {
            return Ok(PathOutcome::Found(Path::new(vec![start])));
        }

        let outcome = match self.strategy {
            SearchStrategy::BreadthFirst => self.breadth_first(grid, start, goal),
            SearchStrategy::AStar => self.a_star(grid, start, goal),
        };
        trace!(
            "Path {} -> {}: {}",
            start,
            goal,
            match &outcome {
                PathOutcome::Found(path) => format!("{} steps", path.steps()),
                PathOutcome::Unreachable => "unreachable".to_string(),
            }
        );
        Ok(outcome)
    }

    fn breadth_first(self, grid: &GridWorld, start: Position, goal: Position) -> PathOutcome {
        let offsets = self.connectivity.offsets();
        let mut parent = vec![NO_PARENT; grid.cell_count()];
        let mut visited = vec![false; grid.cell_count()];
        let mut queue = VecDeque::new();

        visited[grid.index(start)] = true;
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for next in grid.neighbors(current, offsets) {
                let idx = grid.index(next);
                if visited[idx] || grid.is_fire(next) {
                    continue;
                }
                visited[idx] = true;
                parent[idx] = grid.index(current);
                if next == goal {
                    return PathOutcome::Found(rebuild_path(grid, &parent, start, goal));
                }
                queue.push_back(next);
            }
        }

        PathOutcome::Unreachable
    }

    fn a_star(self, grid: &GridWorld, start: Position, goal: Position) -> PathOutcome {
        let offsets = self.connectivity.offsets();
        let mut parent = vec![NO_PARENT; grid.cell_count()];
        let mut g_score = vec![usize::MAX; grid.cell_count()];
        let mut closed = vec![false; grid.cell_count()];
        let mut open = BinaryHeap::new();
        let mut sequence = 0_usize;

        g_score[grid.index(start)] = 0;
        open.push(Reverse(OpenNode {
            f_cost: self.connectivity.distance(start, goal),
            sequence,
            position: start,
        }));

        while let Some(Reverse(node)) = open.pop() {
            let current = node.position;
            let current_idx = grid.index(current);
            if closed[current_idx] {
                continue;
            }
            if current == goal {
                return PathOutcome::Found(rebuild_path(grid, &parent, start, goal));
            }
            closed[current_idx] = true;

            let next_g = g_score[current_idx] + 1;
            for next in grid.neighbors(current, offsets) {
                let idx = grid.index(next);
                if closed[idx] || grid.is_fire(next) || next_g >= g_score[idx] {
                    continue;
                }
                g_score[idx] = next_g;
                parent[idx] = current_idx;
                sequence += 1;
                open.push(Reverse(OpenNode {
                    f_cost: next_g + self.connectivity.distance(next, goal),
                    sequence,
                    position: next,
                }));
            }
        }

        PathOutcome::Unreachable
    }
}

/// Open-list entry; ties on `f_cost` resolve in push order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    f_cost: usize,
    sequence: usize,
    position: Position,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost
            .cmp(&other.f_cost)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn rebuild_path(grid: &GridWorld, parent: &[usize], start: Position, goal: Position) -> Path {
    let start_idx = grid.index(start);
    let mut cells = vec![goal];
    let mut idx = grid.index(goal);
    while idx != start_idx {
        idx = parent[idx];
        cells.push(grid.position_of(idx));
    }
    cells.reverse();
    Path::new(cells)
}

/// Whether any undiscovered cell can still be reached from `from`.
///
/// Flood fills over clear cells (the starting cell is admitted even if it is
/// burning) and stops at the first cell missing from `discovered`.
pub fn any_reachable_undiscovered(
    grid: &GridWorld,
    discovered: &CellMask,
    from: Position,
    connectivity: Connectivity,
) -> bool {
    if !grid.contains(from) {
        return false;
    }

    let offsets = connectivity.offsets();
    let mut visited = vec![false; grid.cell_count()];
    let mut queue = VecDeque::from([from]);
    visited[grid.index(from)] = true;

    while let Some(current) = queue.pop_front() {
        if !discovered.get(current) {
            return true;
        }
        for next in grid.neighbors(current, offsets) {
            let idx = grid.index(next);
            if visited[idx] || grid.is_fire(next) {
                continue;
            }
            visited[idx] = true;
            queue.push_back(next);
        }
    }

    false
}

/// Step distances from one cell to every clear cell reachable from it
#[derive(Debug, Clone)]
pub struct DistanceMap {
    cols: usize,
    distances: Vec<Option<usize>>,
}

impl DistanceMap {
    /// Steps needed to reach `pos`, `None` if unreachable or out of bounds
    pub fn get(&self, pos: Position) -> Option<usize> {
        if pos.col >= self.cols {
            return None;
        }
        self.distances
            .get(pos.row * self.cols + pos.col)
            .copied()
            .flatten()
    }
}

/// Breadth-first distances from `from` over clear cells
pub fn reachable_distances(
    grid: &GridWorld,
    from: Position,
    connectivity: Connectivity,
) -> DistanceMap {
    let mut distances = vec![None; grid.cell_count()];
    if grid.contains(from) {
        let offsets = connectivity.offsets();
        let mut queue = VecDeque::from([from]);
        distances[grid.index(from)] = Some(0);

        while let Some(current) = queue.pop_front() {
            let next_distance = distances[grid.index(current)].map_or(0, |d| d + 1);
            for next in grid.neighbors(current, offsets) {
                let idx = grid.index(next);
                if distances[idx].is_some() || grid.is_fire(next) {
                    continue;
                }
                distances[idx] = Some(next_distance);
                queue.push_back(next);
            }
        }
    }

    DistanceMap {
        cols: grid.cols(),
        distances,
    }
}
