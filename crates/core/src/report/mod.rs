//! Reporting discovered fires to a remote observer
//!
//! The controller only sees the [`Reporter`] trait. Delivery is best effort:
//! a failed report is logged and the mission carries on.
//!
//! Provided sinks:
//! - [`RecordingReporter`]: keeps everything in memory
//! - [`LogReporter`]: writes each event to the `tracing` log
//! - [`StreamReporter`] / [`TcpReporter`]: encodes onto a byte stream
//! - [`ChannelReporter`]: bounded queue drained by a worker thread

pub mod channel;
pub mod codec;
pub mod handoff;
pub mod stream;

pub use channel::ChannelReporter;
pub use codec::{encode_end, encode_fire, ReportDecoder, ReportMessage, WireFormat};
pub use handoff::{read_world, write_world, CLEAR_CODE, FIRE_CODE};
pub use stream::{RetryPolicy, StreamReporter, TcpReporter};

use crate::error::ReportError;
use crate::grid::Position;
use crate::mission::MissionOutcome;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A cell seen burning for the first time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscoveredFireEvent {
    /// Burning cell
    pub position: Position,
    /// Drone step count at discovery (0 = seen from the start cell)
    pub step: u64,
}

/// Sink for discovered fires and the end-of-mission signal
pub trait Reporter {
    /// Notify that a cell is known to be on fire.
    ///
    /// # Errors
    /// Returns a [`ReportError`] if the event could not be delivered.
    fn report_fire(&mut self, event: &DiscoveredFireEvent) -> Result<(), ReportError>;

    /// Notify that the mission is over.
    ///
    /// # Errors
    /// Returns a [`ReportError`] if the signal could not be delivered.
    fn report_end(&mut self, outcome: MissionOutcome) -> Result<(), ReportError>;
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report_fire(&mut self, event: &DiscoveredFireEvent) -> Result<(), ReportError> {
        (**self).report_fire(event)
    }

    fn report_end(&mut self, outcome: MissionOutcome) -> Result<(), ReportError> {
        (**self).report_end(outcome)
    }
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn report_fire(&mut self, event: &DiscoveredFireEvent) -> Result<(), ReportError> {
        (**self).report_fire(event)
    }

    fn report_end(&mut self, outcome: MissionOutcome) -> Result<(), ReportError> {
        (**self).report_end(outcome)
    }
}

/// In-memory reporter, mainly for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    events: Vec<DiscoveredFireEvent>,
    outcome: Option<MissionOutcome>,
    fail_fires: bool,
    rejected: usize,
}

impl RecordingReporter {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// A recorder whose every fire report fails with [`ReportError::Closed`]
    pub fn failing() -> Self {
        Self {
            fail_fires: true,
            ..Self::default()
        }
    }

    /// Events accepted so far
    pub fn events(&self) -> &[DiscoveredFireEvent] {
        &self.events
    }

    /// Positions of accepted events, in report order
    pub fn positions(&self) -> Vec<Position> {
        self.events.iter().map(|e| e.position).collect()
    }

    /// The end signal, once received
    pub fn outcome(&self) -> Option<MissionOutcome> {
        self.outcome
    }

    /// Number of fire reports refused because the recorder is failing
    pub fn rejected(&self) -> usize {
        self.rejected
    }
}

impl Reporter for RecordingReporter {
    fn report_fire(&mut self, event: &DiscoveredFireEvent) -> Result<(), ReportError> {
        if self.fail_fires {
            self.rejected += 1;
            return Err(ReportError::Closed);
        }
        self.events.push(*event);
        Ok(())
    }

    fn report_end(&mut self, outcome: MissionOutcome) -> Result<(), ReportError> {
        self.outcome = Some(outcome);
        Ok(())
    }
}

/// Reporter that writes every event to the log and delivers nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report_fire(&mut self, event: &DiscoveredFireEvent) -> Result<(), ReportError> {
        info!("FIRE at {} (step {})", event.position, event.step);
        Ok(())
    }

    fn report_end(&mut self, outcome: MissionOutcome) -> Result<(), ReportError> {
        info!("Mission over: {}", outcome.describe());
        Ok(())
    }
}
