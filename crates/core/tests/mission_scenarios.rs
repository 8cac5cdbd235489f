//! End-to-end coverage missions on small hand-built and seeded grids

mod common;

use common::still_air;
use fire_scout_core::mission::MissionState;
use fire_scout_core::pathfinding::{any_reachable_undiscovered, reachable_distances};
use fire_scout_core::{
    Connectivity, CoverageController, GridWorld, MissionConfig, MissionOutcome, Pathfinder,
    Position, RecordingReporter, TargetPolicy, VisitOutcome, WorldConfig,
};
use std::collections::HashSet;

fn seeded_world(seed: u64, rows: usize, cols: usize, percent: u8) -> GridWorld {
    WorldConfig {
        rows,
        cols,
        ignition_percent: percent,
        seed: Some(seed),
        ..WorldConfig::default()
    }
    .build()
    .unwrap()
}

fn first_clear(grid: &GridWorld) -> Option<Position> {
    grid.positions().find(|p| !grid.is_fire(*p))
}

#[test]
fn test_single_clear_cell_is_done_immediately() {
    let grid = GridWorld::seeded(1, 1, 9).unwrap();
    let mut controller = CoverageController::new(
        grid,
        still_air(Position::new(0, 0), 2),
        RecordingReporter::new(),
    )
    .unwrap();

    let summary = controller.run();
    assert_eq!(summary.outcome, Some(MissionOutcome::Done));
    assert_eq!(summary.steps, 0);
    assert!(controller.reporter().events().is_empty());
    assert_eq!(controller.reporter().outcome(), Some(MissionOutcome::Done));
}

#[test]
fn test_corner_fire_seen_from_start() {
    let grid = GridWorld::from_layout("...\n...\n..X", 1).unwrap();
    let mut controller = CoverageController::new(
        grid,
        still_air(Position::new(0, 0), 2),
        RecordingReporter::new(),
    )
    .unwrap();

    let summary = controller.run();
    assert_eq!(summary.outcome, Some(MissionOutcome::Done));
    assert_eq!(summary.steps, 0);
    assert_eq!(controller.reporter().positions(), vec![Position::new(2, 2)]);
    assert_eq!(controller.reporter().events()[0].step, 0);
}

#[test]
fn test_diagonal_gap_blocks_four_connected_drone() {
    let grid = GridWorld::from_layout(".X\nX.", 1).unwrap();

    let finder = Pathfinder::new(Connectivity::Four);
    let outcome = finder
        .find_path(&grid, Position::new(0, 0), Position::new(1, 1))
        .unwrap();
    assert!(outcome.is_unreachable());

    for policy in [TargetPolicy::Boustrophedon, TargetPolicy::GreedyFireFirst] {
        let config = MissionConfig {
            connectivity: Connectivity::Four,
            policy,
            ..still_air(Position::new(0, 0), 0)
        };
        let mut controller =
            CoverageController::new(grid.clone(), config, RecordingReporter::new()).unwrap();
        let summary = controller.run();

        assert_eq!(summary.outcome, Some(MissionOutcome::SignalLost), "{policy:?}");
        assert_eq!(summary.steps, 0);
        assert_eq!(summary.cells_discovered, 1);
        assert!(!any_reachable_undiscovered(
            controller.grid(),
            controller.knowledge().discovered(),
            controller.position(),
            Connectivity::Four
        ));
        assert_eq!(
            controller.reporter().outcome(),
            Some(MissionOutcome::SignalLost)
        );
    }
}

#[test]
fn test_diagonal_gap_is_seen_with_range_one() {
    let grid = GridWorld::from_layout(".X\nX.", 1).unwrap();
    let mut controller = CoverageController::new(
        grid,
        still_air(Position::new(0, 0), 1),
        RecordingReporter::new(),
    )
    .unwrap();

    let summary = controller.run();
    assert_eq!(summary.outcome, Some(MissionOutcome::Done));
    let reported: HashSet<_> = controller.reporter().positions().into_iter().collect();
    assert_eq!(
        reported,
        HashSet::from([Position::new(0, 1), Position::new(1, 0)])
    );
}

#[test]
fn test_fire_on_route_forces_replan() {
    let grid = GridWorld::from_layout("......\nX.....", 1)
        .unwrap()
        .with_spread_probability(1.0)
        .unwrap();
    let config = MissionConfig {
        spread_interval: 1,
        ..still_air(Position::new(0, 5), 0)
    };
    let mut controller = CoverageController::new(grid, config, RecordingReporter::new()).unwrap();

    // the target ignites after the first step and the front reaches the
    // route after the second
    let outcome = controller.visit(Position::new(0, 0)).unwrap();
    assert_eq!(outcome, VisitOutcome::Skipped);

    let summary = controller.summary();
    assert_eq!(summary.steps, 2);
    assert_eq!(summary.replans, 1);
    assert_eq!(controller.position().col, 3);
    assert_eq!(controller.state(), MissionState::Scanning);
}

#[test]
fn test_greedy_heads_for_fire_front() {
    let layout = "\
        .........
        .........
        ....X....
        .........
        .........";
    let grid = GridWorld::from_layout(layout, 1).unwrap();
    let config = MissionConfig {
        policy: TargetPolicy::GreedyFireFirst,
        ..still_air(Position::new(2, 2), 2)
    };
    let mut controller = CoverageController::new(grid, config, RecordingReporter::new()).unwrap();

    let mut first_state = None;
    let summary = controller.run_with(|snap| {
        first_state.get_or_insert(snap.state);
    });

    assert_eq!(
        first_state,
        Some(MissionState::Stepping {
            target: Position::new(1, 5)
        })
    );
    assert_eq!(summary.outcome, Some(MissionOutcome::Done));
    assert_eq!(controller.reporter().positions(), vec![Position::new(2, 4)]);
    assert!(controller.knowledge().discovered().is_full());
}

#[test]
fn test_seeded_missions_keep_invariants() {
    for seed in 0..40 {
        for policy in [TargetPolicy::Boustrophedon, TargetPolicy::GreedyFireFirst] {
            let grid = seeded_world(seed, 12, 12, 12);
            let Some(start) = first_clear(&grid) else {
                continue;
            };
            let config = MissionConfig {
                start,
                policy,
                spread_interval: 3,
                ..MissionConfig::default()
            };

            let mut path = vec![start];
            let mut controller =
                CoverageController::new(grid, config, RecordingReporter::new()).unwrap();
            let summary = controller.run_with(|snap| path.push(snap.position));

            // one cell per step
            assert_eq!(path.len() as u64, summary.steps + 1);
            for pair in path.windows(2) {
                assert!(Connectivity::Eight.is_adjacent(pair[0], pair[1]));
            }

            // each fire reported once and only after it was seen
            let events = controller.reporter().events();
            let unique: HashSet<_> = events.iter().map(|e| e.position).collect();
            assert_eq!(unique.len(), events.len(), "seed {seed}");
            for event in events {
                assert!(controller.grid().is_fire(event.position));
                assert!(controller.knowledge().is_discovered(event.position));
                assert!(event.step <= summary.steps);
            }
            assert_eq!(summary.fires_reported as usize, events.len());

            assert!(summary.targets_selected <= 144);
            assert_eq!(controller.reporter().outcome(), summary.outcome);
            if summary.outcome == Some(MissionOutcome::Done) {
                // whatever is left unseen is burning or out of reach
                let distances = reachable_distances(
                    controller.grid(),
                    controller.position(),
                    Connectivity::Eight,
                );
                let discovered = controller.knowledge().discovered();
                for cell in discovered.unset_positions() {
                    assert!(
                        controller.grid().is_fire(cell) || distances.get(cell).is_none(),
                        "seed {seed} {policy:?}: {cell} was left reachable"
                    );
                }
                assert!(!any_reachable_undiscovered(
                    controller.grid(),
                    discovered,
                    controller.position(),
                    Connectivity::Eight
                ));
                // greedy only stops early when it is cut off
                if policy == TargetPolicy::GreedyFireFirst {
                    assert!(discovered.is_full(), "seed {seed}");
                }
            }
        }
    }
}

#[test]
fn test_same_seed_same_mission() {
    let run = || {
        let grid = seeded_world(77, 15, 15, 10);
        let start = first_clear(&grid).unwrap();
        let config = MissionConfig {
            start,
            ..MissionConfig::default()
        };
        let mut controller =
            CoverageController::new(grid, config, RecordingReporter::new()).unwrap();
        let summary = controller.run();
        (summary, controller.into_reporter().events().to_vec())
    };

    assert_eq!(run(), run());
}

#[test]
fn test_report_failures_do_not_change_the_flight() {
    let fly = |reporter: RecordingReporter| {
        let grid = seeded_world(5, 10, 10, 15);
        let start = first_clear(&grid).unwrap();
        let config = MissionConfig {
            start,
            ..MissionConfig::default()
        };
        CoverageController::new(grid, config, reporter)
            .unwrap()
            .run()
    };

    let delivered = fly(RecordingReporter::new());
    let refused = fly(RecordingReporter::failing());

    assert_eq!(delivered.outcome, refused.outcome);
    assert_eq!(delivered.steps, refused.steps);
    assert_eq!(delivered.cells_discovered, refused.cells_discovered);
    assert_eq!(delivered.fires_reported, refused.fires_reported);
    assert_eq!(delivered.report_failures, 0);
    assert_eq!(refused.report_failures, refused.fires_reported);
}

#[test]
fn test_aggressive_spread_still_terminates() {
    for seed in 0..20 {
        let grid = seeded_world(seed, 10, 10, 5)
            .with_spread_probability(1.0)
            .unwrap();
        let Some(start) = first_clear(&grid) else {
            continue;
        };
        let config = MissionConfig {
            start,
            perception_range: 1,
            spread_interval: 1,
            ..MissionConfig::default()
        };
        let mut controller =
            CoverageController::new(grid, config, RecordingReporter::new()).unwrap();
        let summary = controller.run();
        assert!(summary.targets_selected <= 100);
        assert!(controller.state().is_terminal());
    }
}
