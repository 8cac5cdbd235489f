//! Coverage controller
//!
//! Drives one drone over a [`GridWorld`] until every reachable cell has been
//! observed. Each iteration picks a target, plans a path on the live grid,
//! then walks it one cell at a time. After every committed step the drone
//! observes its surroundings and the fire may spread, so the route is checked
//! again before each move and re-planned when the next cell has caught fire.
//!
//! ```text
//! Idle -> Scanning -> Stepping <-> Replanning
//!            ^           |
//!            +-----------+
//! Scanning -> Done | SignalLost | StepLimitReached
//! ```

use super::config::MissionConfig;
use super::state::{MissionOutcome, MissionState, MissionSummary, TargetPolicy, VisitOutcome};
use super::targets::{greedy_fire_first, BoustrophedonScan};
use crate::error::ScoutError;
use crate::grid::{GridWorld, Position};
use crate::pathfinding::{any_reachable_undiscovered, Path, PathOutcome, Pathfinder};
use crate::perception::{reveal, RevealSummary, SurveyKnowledge};
use crate::report::Reporter;
use tracing::{debug, info, warn};

/// Read-only view handed to observers after every committed step
#[derive(Debug, Clone, Copy)]
pub struct MissionSnapshot<'a> {
    /// Ground truth
    pub grid: &'a GridWorld,
    /// What the drone has seen
    pub knowledge: &'a SurveyKnowledge,
    /// Drone position
    pub position: Position,
    /// Steps committed so far
    pub steps: u64,
    /// Controller state
    pub state: MissionState,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    steps: u64,
    spread_ticks: u64,
    targets_selected: u64,
    replans: u64,
    fires_reported: u64,
    report_failures: u64,
}

/// Single-drone coverage mission over a burning grid
pub struct CoverageController<P: Reporter> {
    grid: GridWorld,
    knowledge: SurveyKnowledge,
    config: MissionConfig,
    pathfinder: Pathfinder,
    reporter: P,
    position: Position,
    state: MissionState,
    scan: BoustrophedonScan,
    last_target: Option<Position>,
    counters: Counters,
}

impl<P: Reporter> CoverageController<P> {
    /// Prepare a mission. Nothing is observed until the mission starts.
    ///
    /// # Errors
    /// - [`ScoutError::InvalidConfig`] if the mission configuration is invalid
    /// - [`ScoutError::OutOfBounds`] if the start is off the grid
    /// - [`ScoutError::StartOnFire`] if the start cell is burning
    pub fn new(grid: GridWorld, config: MissionConfig, reporter: P) -> Result<Self, ScoutError> {
        config.validate()?;
        let start = config.start;
        grid.check_bounds(start)?;
        if grid.is_fire(start) {
            return Err(ScoutError::StartOnFire(start));
        }

        Ok(Self {
            knowledge: SurveyKnowledge::for_grid(&grid),
            scan: BoustrophedonScan::for_grid(&grid),
            pathfinder: config.pathfinder(),
            grid,
            config,
            reporter,
            position: start,
            state: MissionState::Idle,
            last_target: None,
            counters: Counters::default(),
        })
    }

    /// Ground truth
    pub fn grid(&self) -> &GridWorld {
        &self.grid
    }

    /// What the drone has seen so far
    pub fn knowledge(&self) -> &SurveyKnowledge {
        &self.knowledge
    }

    /// Current drone position
    pub fn position(&self) -> Position {
        self.position
    }

    /// Current controller state
    pub fn state(&self) -> MissionState {
        self.state
    }

    /// Mission parameters
    pub fn config(&self) -> &MissionConfig {
        &self.config
    }

    /// The reporter
    pub fn reporter(&self) -> &P {
        &self.reporter
    }

    /// Consume the controller and hand back the reporter
    pub fn into_reporter(self) -> P {
        self.reporter
    }

    /// Statistics so far. The outcome stays `None` until the mission ends.
    pub fn summary(&self) -> MissionSummary {
        MissionSummary {
            outcome: self.state.outcome(),
            steps: self.counters.steps,
            spread_ticks: self.counters.spread_ticks,
            targets_selected: self.counters.targets_selected,
            replans: self.counters.replans,
            fires_reported: self.counters.fires_reported,
            report_failures: self.counters.report_failures,
            cells_discovered: self.knowledge.discovered().count(),
            total_cells: self.grid.cell_count(),
            fires_on_grid: self.grid.fire_count(),
            final_position: self.position,
        }
    }

    fn snapshot(&self) -> MissionSnapshot<'_> {
        MissionSnapshot {
            grid: &self.grid,
            knowledge: &self.knowledge,
            position: self.position,
            steps: self.counters.steps,
            state: self.state,
        }
    }

    /// Run the mission to completion
    pub fn run(&mut self) -> MissionSummary {
        self.run_with(|_| {})
    }

    /// Run the mission to completion, calling `observer` after every step.
    ///
    /// Calling this again on a finished mission returns the same summary
    /// without moving or reporting anything.
    pub fn run_with<F>(&mut self, mut observer: F) -> MissionSummary
    where
        F: FnMut(&MissionSnapshot<'_>),
    {
        if self.state.is_terminal() {
            return self.summary();
        }
        self.start();
        let outcome = self.survey(&mut observer);
        self.finish(outcome)
    }

    /// Fly to a caller-chosen cell using the normal stepping rules.
    ///
    /// Starts the mission if it has not started yet. If the visit ends the
    /// mission (signal lost or step limit) the end signal is sent.
    ///
    /// # Errors
    /// Returns [`ScoutError::OutOfBounds`] if `target` is off the grid, or
    /// [`ScoutError::InvalidConfig`] if the mission is already over.
    pub fn visit(&mut self, target: Position) -> Result<VisitOutcome, ScoutError> {
        self.grid.check_bounds(target)?;
        if self.state.is_terminal() {
            return Err(ScoutError::InvalidConfig(format!(
                "mission already ended in state {}",
                self.state.name()
            )));
        }
        self.start();
        self.counters.targets_selected += 1;

        let result = self.pursue(target, &mut |_: &MissionSnapshot<'_>| {});
        match result {
            VisitOutcome::SignalLost => {
                self.finish(MissionOutcome::SignalLost);
            }
            VisitOutcome::StepLimitReached => {
                self.finish(MissionOutcome::StepLimitReached);
            }
            VisitOutcome::Reached | VisitOutcome::Skipped => {
                self.state = MissionState::Scanning;
            }
        }
        Ok(result)
    }

    fn start(&mut self) {
        if self.state != MissionState::Idle {
            return;
        }
        info!(
            "Starting survey of {}x{} grid from {} ({:?}, {:?}, range {}, spread every {} steps)",
            self.grid.rows(),
            self.grid.cols(),
            self.position,
            self.config.policy,
            self.config.connectivity,
            self.config.perception_range,
            self.config.spread_interval
        );
        self.state = MissionState::Scanning;
        let seen = self.observe();
        debug!(
            "Initial scan: {} cells discovered, {} fires reported",
            seen.newly_discovered, seen.fires_reported
        );
    }

    fn survey<F>(&mut self, observer: &mut F) -> MissionOutcome
    where
        F: FnMut(&MissionSnapshot<'_>),
    {
        let max_selections = self.grid.cell_count() as u64;
        let mut selections = 0u64;

        loop {
            self.state = MissionState::Scanning;
            let Some(target) = self.next_target() else {
                return self.no_target_left();
            };

            if self.last_target == Some(target) {
                warn!("Target {} selected twice in a row, giving up", target);
                return MissionOutcome::SignalLost;
            }
            if selections >= max_selections {
                warn!("Selected {} targets without finishing, giving up", selections);
                return MissionOutcome::SignalLost;
            }
            self.last_target = Some(target);
            selections += 1;
            self.counters.targets_selected += 1;

            let steps_before = self.counters.steps;
            let discovered_before = self.knowledge.discovered().count();

            match self.pursue(target, observer) {
                VisitOutcome::Reached => {
                    let stalled = self.counters.steps == steps_before
                        && self.knowledge.discovered().count() == discovered_before;
                    if stalled {
                        warn!("No progress towards {}, giving up", target);
                        return MissionOutcome::SignalLost;
                    }
                }
                VisitOutcome::Skipped => {}
                VisitOutcome::SignalLost => return MissionOutcome::SignalLost,
                VisitOutcome::StepLimitReached => return MissionOutcome::StepLimitReached,
            }
        }
    }

    fn next_target(&mut self) -> Option<Position> {
        match self.config.policy {
            TargetPolicy::Boustrophedon => {
                let knowledge = &self.knowledge;
                self.scan.find(|&p| !knowledge.is_discovered(p))
            }
            TargetPolicy::GreedyFireFirst => greedy_fire_first(
                &self.grid,
                &self.knowledge,
                self.position,
                self.config.connectivity,
            ),
        }
    }

    fn no_target_left(&self) -> MissionOutcome {
        let left = self.grid.cell_count() - self.knowledge.discovered().count();
        match self.config.policy {
            // Greedy only offers reachable cells, so anything left is cut off
            TargetPolicy::GreedyFireFirst if left > 0 => {
                warn!(
                    "Signal lost at {}: {} cells can never be reached",
                    self.position, left
                );
                MissionOutcome::SignalLost
            }
            TargetPolicy::GreedyFireFirst | TargetPolicy::Boustrophedon => MissionOutcome::Done,
        }
    }

    fn plan(&self, target: Position) -> Option<Path> {
        match self.pathfinder.find_path(&self.grid, self.position, target) {
            Ok(PathOutcome::Found(path)) => Some(path),
            Ok(PathOutcome::Unreachable) => None,
            Err(e) => {
                warn!("Planning to {} failed: {}", target, e);
                None
            }
        }
    }

    fn pursue<F>(&mut self, target: Position, observer: &mut F) -> VisitOutcome
    where
        F: FnMut(&MissionSnapshot<'_>),
    {
        let Some(mut path) = self.plan(target) else {
            return self.unreachable(target);
        };
        debug!("Heading to {} ({} steps)", target, path.steps());
        self.state = MissionState::Stepping { target };

        let mut cursor = 1;
        while cursor < path.len() {
            let next = path.cells()[cursor];

            if self.grid.is_fire(next) {
                self.state = MissionState::Replanning { target };
                self.counters.replans += 1;
                debug!("{} caught fire, re-planning route to {}", next, target);

                let Some(fresh) = self.plan(target) else {
                    return self.unreachable(target);
                };
                path = fresh;
                cursor = 1;
                self.state = MissionState::Stepping { target };
                continue;
            }

            if let Some(limit) = self.config.max_steps {
                if self.counters.steps >= limit {
                    warn!("Step limit of {} reached", limit);
                    return VisitOutcome::StepLimitReached;
                }
            }

            self.commit_step(next);
            observer(&self.snapshot());
            cursor += 1;
        }

        VisitOutcome::Reached
    }

    fn unreachable(&self, target: Position) -> VisitOutcome {
        let discovered = self.knowledge.discovered();
        if any_reachable_undiscovered(&self.grid, discovered, self.position, self.config.connectivity)
        {
            debug!("{} is unreachable, skipping", target);
            VisitOutcome::Skipped
        } else {
            warn!(
                "Signal lost at {}: {} cells can never be reached",
                self.position,
                self.grid.cell_count() - discovered.count()
            );
            VisitOutcome::SignalLost
        }
    }

    fn commit_step(&mut self, next: Position) {
        self.position = next;
        self.counters.steps += 1;
        self.observe();

        if self.counters.steps % u64::from(self.config.spread_interval) == 0 {
            let ignited = self.grid.spread_fires();
            self.counters.spread_ticks += 1;
            debug!(
                "Step {}: fire spread to {} new cells",
                self.counters.steps, ignited
            );
        }
    }

    fn observe(&mut self) -> RevealSummary {
        let seen = reveal(
            &self.grid,
            &mut self.knowledge,
            self.position,
            self.config.perception_range,
            self.counters.steps,
            &mut self.reporter,
        );
        self.counters.fires_reported += seen.fires_reported as u64;
        self.counters.report_failures += seen.report_failures as u64;
        seen
    }

    fn finish(&mut self, outcome: MissionOutcome) -> MissionSummary {
        self.state = MissionState::from(outcome);
        if let Err(e) = self.reporter.report_end(outcome) {
            warn!("Failed to send end of mission: {}", e);
            self.counters.report_failures += 1;
        }

        let summary = self.summary();
        info!(
            "{} after {} steps: {}/{} cells discovered, {} fires reported",
            outcome.describe(),
            summary.steps,
            summary.cells_discovered,
            summary.total_cells,
            summary.fires_reported
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Connectivity;
    use crate::report::RecordingReporter;

    fn config(range: usize) -> MissionConfig {
        MissionConfig {
            perception_range: range,
            spread_interval: 1_000,
            ..MissionConfig::default()
        }
    }

    #[test]
    fn test_rejects_burning_start() {
        let grid = GridWorld::from_layout("X.\n..", 1).unwrap();
        let result = CoverageController::new(grid, config(1), RecordingReporter::new());
        assert!(matches!(result, Err(ScoutError::StartOnFire(_))));
    }

    #[test]
    fn test_rejects_start_off_grid() {
        let grid = GridWorld::seeded(2, 2, 1).unwrap();
        let mission = MissionConfig {
            start: Position::new(5, 0),
            ..config(1)
        };
        let result = CoverageController::new(grid, mission, RecordingReporter::new());
        assert!(matches!(result, Err(ScoutError::OutOfBounds { .. })));
    }

    #[test]
    fn test_single_cell_grid_finishes_without_moving() {
        let grid = GridWorld::seeded(1, 1, 1).unwrap();
        let mut controller =
            CoverageController::new(grid, config(2), RecordingReporter::new()).unwrap();
        let summary = controller.run();
        assert_eq!(summary.outcome, Some(MissionOutcome::Done));
        assert_eq!(summary.steps, 0);
        assert_eq!(controller.reporter().outcome(), Some(MissionOutcome::Done));
    }

    #[test]
    fn test_clear_grid_is_fully_covered() {
        let grid = GridWorld::seeded(6, 6, 1).unwrap();
        let mut controller =
            CoverageController::new(grid, config(1), RecordingReporter::new()).unwrap();
        let summary = controller.run();
        assert_eq!(summary.outcome, Some(MissionOutcome::Done));
        assert!(controller.knowledge().discovered().is_full());
        assert!(controller.reporter().events().is_empty());
        assert_eq!(controller.state(), MissionState::Done);
    }

    #[test]
    fn test_observer_sees_every_step() {
        let grid = GridWorld::seeded(5, 5, 3).unwrap();
        let mut controller =
            CoverageController::new(grid, config(0), RecordingReporter::new()).unwrap();
        let mut seen = Vec::new();
        let summary = controller.run_with(|snap| seen.push((snap.steps, snap.position)));

        assert_eq!(seen.len() as u64, summary.steps);
        for (i, (step, _)) in seen.iter().enumerate() {
            assert_eq!(*step, i as u64 + 1);
        }
        for pair in seen.windows(2) {
            assert!(Connectivity::Eight.is_adjacent(pair[0].1, pair[1].1));
        }
    }

    #[test]
    fn test_rerun_is_a_no_op() {
        let grid = GridWorld::seeded(4, 4, 2).unwrap();
        let mut controller =
            CoverageController::new(grid, config(1), RecordingReporter::new()).unwrap();
        let first = controller.run();
        let second = controller.run();
        assert_eq!(first, second);
    }

    #[test]
    fn test_step_limit() {
        let grid = GridWorld::seeded(10, 10, 1).unwrap();
        let mission = MissionConfig {
            max_steps: Some(3),
            ..config(0)
        };
        let mut controller =
            CoverageController::new(grid, mission, RecordingReporter::new()).unwrap();
        let summary = controller.run();
        assert_eq!(summary.outcome, Some(MissionOutcome::StepLimitReached));
        assert_eq!(summary.steps, 3);
        assert_eq!(
            controller.reporter().outcome(),
            Some(MissionOutcome::StepLimitReached)
        );
    }

    #[test]
    fn test_boxed_in_drone_loses_signal() {
        for policy in [TargetPolicy::Boustrophedon, TargetPolicy::GreedyFireFirst] {
            let grid = GridWorld::from_layout(
                ".X...
                 XX...
                 .....",
                1,
            )
            .unwrap();
            let mission = MissionConfig {
                policy,
                ..config(1)
            };
            let mut controller =
                CoverageController::new(grid, mission, RecordingReporter::new()).unwrap();
            let summary = controller.run();
            assert_eq!(summary.outcome, Some(MissionOutcome::SignalLost), "{policy:?}");
            assert_eq!(summary.steps, 0);
            assert_eq!(summary.fires_reported, 3);
            assert_eq!(
                controller.reporter().outcome(),
                Some(MissionOutcome::SignalLost)
            );
        }
    }

    #[test]
    fn test_visit_checks_bounds() {
        let grid = GridWorld::seeded(3, 3, 1).unwrap();
        let mut controller =
            CoverageController::new(grid, config(0), RecordingReporter::new()).unwrap();
        assert!(matches!(
            controller.visit(Position::new(3, 0)),
            Err(ScoutError::OutOfBounds { .. })
        ));
        assert_eq!(controller.visit(Position::new(2, 2)), Ok(VisitOutcome::Reached));
        assert_eq!(controller.position(), Position::new(2, 2));

        let summary = controller.summary();
        assert_eq!(summary.steps, 2);
        assert_eq!(summary.outcome, None);
        assert!(summary.to_string().contains("in progress"));
    }
}
