use clap::Parser;
use fire_scout_core::report::{write_world, ReportDecoder, ReportMessage};
use fire_scout_core::{GridWorld, Position, ScoutError, WireError, WireFormat, WorldConfig};
use std::collections::BTreeSet;
use std::io::{self, BufReader};
use std::net::TcpListener;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
enum StationError {
    #[error("socket error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Scout(#[from] ScoutError),

    #[error(transparent)]
    Wire(#[from] WireError),
}

/// Base station receiving fire reports from a drone
#[derive(Parser, Debug)]
#[command(name = "base-station")]
#[command(about = "Receives fire reports from a scouting drone", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// TCP port
    #[arg(short, long, default_value_t = 12345)]
    port: u16,

    /// Generate a world and send it to the drone on connect
    #[arg(long)]
    send_world: bool,

    /// Rows of the generated world
    #[arg(long, default_value_t = 15)]
    rows: usize,

    /// Columns of the generated world
    #[arg(long, default_value_t = 15)]
    cols: usize,

    /// Chance (0-100) that each cell starts burning
    #[arg(short, long, default_value_t = 10)]
    ignition: u8,

    /// Random seed for the generated world
    #[arg(short, long)]
    seed: Option<u64>,

    /// Expect 8-byte binary records instead of text lines
    #[arg(long)]
    binary: bool,
}

fn generate(args: &Args) -> Result<GridWorld, ScoutError> {
    WorldConfig {
        rows: args.rows,
        cols: args.cols,
        ignition_percent: args.ignition,
        seed: args.seed,
        ..WorldConfig::default()
    }
    .build()
}

fn run(args: &Args) -> Result<(), StationError> {
    // Fail on a bad world before accepting anyone
    let world = if args.send_world {
        Some(generate(args)?)
    } else {
        None
    };

    let listener = TcpListener::bind((args.bind.as_str(), args.port))?;
    info!("Listening on {}", listener.local_addr()?);
    println!("[BaseStation] Listening on port {}...", args.port);

    let (mut stream, peer) = listener.accept()?;
    println!("[BaseStation] Drone connected from {peer}");

    if let Some(world) = &world {
        write_world(&mut stream, world)?;
        println!(
            "[BaseStation] Sent {}x{} map ({} burning). Waiting for discovered fires...",
            world.rows(),
            world.cols(),
            world.fire_count()
        );
    }

    let format = if args.binary {
        WireFormat::Binary
    } else {
        WireFormat::Line
    };
    let mut reported: BTreeSet<Position> = BTreeSet::new();
    let mut ended = false;

    for message in ReportDecoder::new(BufReader::new(stream), format) {
        match message? {
            ReportMessage::Fire(pos) => {
                if world.as_ref().is_some_and(|w| !w.contains(pos)) {
                    warn!("Out-of-bounds fire report {}", pos);
                    println!("[BaseStation] Received out-of-bounds fire coord: {pos}");
                    continue;
                }
                if reported.insert(pos) {
                    println!("[BaseStation] Discovered fire at {pos}");
                } else {
                    warn!("Duplicate fire report {}", pos);
                }
            }
            ReportMessage::End => ended = true,
        }
    }

    if !ended && format == WireFormat::Line {
        println!("[BaseStation] Drone disconnected without END");
    }
    match &world {
        Some(world) => println!(
            "[BaseStation] {} fires reported ({} burning when the map was sent)",
            reported.len(),
            world.fire_count()
        ),
        None => println!("[BaseStation] {} fires reported", reported.len()),
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fire_scout=info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
