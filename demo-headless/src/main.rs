mod view;

use clap::{Parser, ValueEnum};
use fire_scout_core::report::{read_world, RetryPolicy};
use fire_scout_core::{
    ChannelReporter, Connectivity, CoverageController, GridWorld, LogReporter, MissionOutcome,
    Position, ReportError, Reporter, ScoutConfig, ScoutError, SearchStrategy, TargetPolicy,
    TcpReporter, WireError, WireFormat,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;
use std::net::TcpStream;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

const WRITE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {}: {source}", .path.display())]
    ReadConfig { path: PathBuf, source: io::Error },

    #[error("invalid TOML in {}: {source}", .path.display())]
    ParseConfig {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("cannot print configuration: {0}")]
    PrintConfig(#[from] toml::ser::Error),

    #[error("base station connection failed: {0}")]
    Connect(#[from] io::Error),

    #[error(transparent)]
    Scout(#[from] ScoutError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Boustrophedon,
    GreedyFireFirst,
}

impl From<PolicyArg> for TargetPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Boustrophedon => TargetPolicy::Boustrophedon,
            PolicyArg::GreedyFireFirst => TargetPolicy::GreedyFireFirst,
        }
    }
}

/// Drone surveying a spreading wildfire
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
#[command(name = "fire-scout")]
#[command(about = "Single-drone wildfire coverage simulation", long_about = None)]
struct Args {
    /// TOML configuration file; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid rows
    #[arg(long)]
    rows: Option<usize>,

    /// Grid columns
    #[arg(long)]
    cols: Option<usize>,

    /// Chance (0-100) that each cell starts burning
    #[arg(short, long)]
    ignition: Option<u8>,

    /// Per-neighbour ignition probability per spread tick
    #[arg(long)]
    spread_probability: Option<f64>,

    /// Random seed for a reproducible world
    #[arg(short, long)]
    seed: Option<u64>,

    /// Start row
    #[arg(long)]
    start_row: Option<usize>,

    /// Start column
    #[arg(long)]
    start_col: Option<usize>,

    /// Perception range (Chebyshev radius)
    #[arg(short, long)]
    range: Option<usize>,

    /// Fire spreads once every this many steps
    #[arg(long)]
    spread_interval: Option<u32>,

    /// Target selection policy
    #[arg(short, long, value_enum)]
    policy: Option<PolicyArg>,

    /// Move orthogonally only
    #[arg(long)]
    four_connected: bool,

    /// Plan with A* instead of breadth-first search
    #[arg(long)]
    astar: bool,

    /// Stop after this many steps
    #[arg(long)]
    max_steps: Option<u64>,

    /// Base station address (host:port); without it fires are only logged
    #[arg(long)]
    connect: Option<String>,

    /// Take the world from the base station instead of generating it
    #[arg(long, requires = "connect")]
    receive_world: bool,

    /// Send 8-byte binary records instead of text lines
    #[arg(long)]
    binary: bool,

    /// Deliver reports through a bounded queue of this size
    #[arg(short, long)]
    queue: Option<usize>,

    /// Draw the drone's map after every step
    #[arg(long)]
    render: bool,

    /// Pause between rendered frames, in milliseconds
    #[arg(long, default_value_t = 150)]
    frame_ms: u64,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn apply(&self, config: &mut ScoutConfig) {
        let world = &mut config.world;
        if let Some(rows) = self.rows {
            world.rows = rows;
        }
        if let Some(cols) = self.cols {
            world.cols = cols;
        }
        if let Some(percent) = self.ignition {
            world.ignition_percent = percent;
        }
        if let Some(p) = self.spread_probability {
            world.spread_probability = p;
        }
        if self.seed.is_some() {
            world.seed = self.seed;
        }

        let mission = &mut config.mission;
        if let Some(row) = self.start_row {
            mission.start.row = row;
        }
        if let Some(col) = self.start_col {
            mission.start.col = col;
        }
        if let Some(range) = self.range {
            mission.perception_range = range;
        }
        if let Some(interval) = self.spread_interval {
            mission.spread_interval = interval;
        }
        if let Some(policy) = self.policy {
            mission.policy = policy.into();
        }
        if self.four_connected {
            mission.connectivity = Connectivity::Four;
        }
        if self.astar {
            mission.search = SearchStrategy::AStar;
        }
        if self.max_steps.is_some() {
            mission.max_steps = self.max_steps;
        }
    }

    fn wire_format(&self) -> WireFormat {
        if self.binary {
            WireFormat::Binary
        } else {
            WireFormat::Line
        }
    }
}

fn load_config(args: &Args) -> Result<ScoutConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|source| CliError::ReadConfig {
                path: path.clone(),
                source,
            })?;
            info!("Loading configuration from {:?}", path);
            toml::from_str(&text).map_err(|source| CliError::ParseConfig {
                path: path.clone(),
                source,
            })?
        }
        None => ScoutConfig::default(),
    };
    args.apply(&mut config);
    Ok(config)
}

/// Move the start to the first clear cell if the configured one is burning
fn clear_start(grid: &GridWorld, wanted: Position) -> Position {
    if !grid.is_fire(wanted) {
        return wanted;
    }
    match grid.positions().find(|p| !grid.is_fire(*p)) {
        Some(pos) => {
            warn!("Start {} is on fire, taking off from {} instead", wanted, pos);
            pos
        }
        None => wanted,
    }
}

fn run(args: &Args) -> Result<Option<MissionOutcome>, CliError> {
    let mut config = load_config(args)?;
    if args.print_config {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(Some(MissionOutcome::Done));
    }

    config.world.validate()?;
    config.mission.validate()?;
    if !args.receive_world {
        config.validate()?;
    }

    let format = args.wire_format();
    let (grid, reporter): (GridWorld, Box<dyn Reporter + Send>) = match &args.connect {
        Some(addr) => {
            info!("Connecting to base station at {}", addr);
            let mut stream = TcpStream::connect(addr.as_str())?;
            let grid = if args.receive_world {
                let rng = match config.world.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_os_rng(),
                };
                read_world(&mut stream, rng)?
                    .with_spread_probability(config.world.spread_probability)?
            } else {
                config.world.build()?
            };
            let tcp =
                TcpReporter::from_stream(stream, format, RetryPolicy::default(), Some(WRITE_TIMEOUT))?;
            let reporter: Box<dyn Reporter + Send> = Box::new(tcp);
            (grid, reporter)
        }
        None => {
            let reporter: Box<dyn Reporter + Send> = Box::new(LogReporter);
            (config.world.build()?, reporter)
        }
    };

    let reporter: Box<dyn Reporter> = match args.queue {
        Some(capacity) => Box::new(ChannelReporter::spawn(reporter, capacity)?),
        None => reporter,
    };

    config.mission.start = clear_start(&grid, config.mission.start);
    let mut controller = CoverageController::new(grid, config.mission, reporter)?;

    let frame = Duration::from_millis(args.frame_ms);
    let summary = controller.run_with(|snapshot| {
        if args.render {
            print!("{}{}", view::CLEAR_SCREEN, view::render(snapshot));
            thread::sleep(frame);
        }
    });

    println!("\n=== Mission Summary ===");
    println!("{summary}");
    Ok(summary.outcome)
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
        Ok(Some(outcome)) if outcome.is_complete() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(2),
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
