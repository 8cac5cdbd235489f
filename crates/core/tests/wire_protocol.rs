//! Drone and base station talking over a loopback TCP connection

mod common;

use common::still_air;
use fire_scout_core::report::{
    read_world, write_world, ReportDecoder, ReportMessage, RetryPolicy,
};
use fire_scout_core::{
    ChannelReporter, CoverageController, GridWorld, MissionOutcome, Position, TcpReporter,
    WireFormat,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::BufReader;
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

/// Accept one drone, optionally send it `world`, and collect its reports
fn spawn_base_station(
    world: Option<GridWorld>,
    format: WireFormat,
) -> (String, thread::JoinHandle<Vec<ReportMessage>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        if let Some(world) = world {
            write_world(&mut stream, &world).unwrap();
        }
        ReportDecoder::new(BufReader::new(stream), format)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    });
    (addr, handle)
}

fn fires(messages: &[ReportMessage]) -> Vec<Position> {
    messages
        .iter()
        .filter_map(|m| match m {
            ReportMessage::Fire(p) => Some(*p),
            ReportMessage::End => None,
        })
        .collect()
}

#[test]
fn test_world_handoff_then_line_reports() {
    let world = GridWorld::from_layout("....\n.X..\n...X", 4).unwrap();
    let (addr, station) = spawn_base_station(Some(world.clone()), WireFormat::Line);

    let mut stream = std::net::TcpStream::connect(&addr).unwrap();
    let received = read_world(&mut stream, StdRng::seed_from_u64(8)).unwrap();
    assert_eq!(received.cells(), world.cells());

    let reporter = TcpReporter::from_stream(
        stream,
        WireFormat::Line,
        RetryPolicy::default(),
        Some(Duration::from_secs(2)),
    )
    .unwrap();
    let mut controller =
        CoverageController::new(received, still_air(Position::new(0, 0), 1), reporter).unwrap();
    let summary = controller.run();
    drop(controller);

    let messages = station.join().unwrap();
    assert_eq!(summary.outcome, Some(MissionOutcome::Done));
    assert_eq!(messages.last(), Some(&ReportMessage::End));
    assert_eq!(
        fires(&messages),
        vec![Position::new(1, 1), Position::new(2, 3)]
    );
}

#[test]
fn test_binary_reports_through_queue() {
    let world = GridWorld::from_layout("X....\n.....\n....X", 2).unwrap();
    let (addr, station) = spawn_base_station(None, WireFormat::Binary);

    let tcp = TcpReporter::connect(
        addr.as_str(),
        WireFormat::Binary,
        RetryPolicy::none(),
        None,
    )
    .unwrap();
    let reporter = ChannelReporter::spawn(tcp, 64).unwrap();
    let mut controller =
        CoverageController::new(world, still_air(Position::new(1, 2), 2), reporter).unwrap();
    let summary = controller.run();
    assert_eq!(summary.report_failures, 0);

    // closing the socket ends the binary stream
    let tcp = controller.into_reporter().shutdown().unwrap();
    assert_eq!(tcp.sent(), 2);
    drop(tcp);

    let messages = station.join().unwrap();
    assert_eq!(
        fires(&messages),
        vec![Position::new(0, 0), Position::new(2, 4)]
    );
}
