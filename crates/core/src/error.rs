//! Error types for the scout simulation
//!
//! Path-finding failure and signal loss are not errors: they are ordinary
//! outcomes carried by [`PathOutcome`](crate::pathfinding::PathOutcome) and
//! [`MissionOutcome`](crate::mission::MissionOutcome).

use crate::grid::Position;
use std::io;
use thiserror::Error;

/// Errors raised while building or driving a simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoutError {
    /// Grid dimensions must both be positive.
    #[error("invalid grid dimensions {rows}x{cols}: rows and cols must be positive")]
    InvalidDimensions {
        /// Requested row count
        rows: usize,
        /// Requested column count
        cols: usize,
    },

    /// A position lies outside the grid.
    #[error("position {position} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        /// Offending position
        position: Position,
        /// Grid row count
        rows: usize,
        /// Grid column count
        cols: usize,
    },

    /// A probability or percentage parameter is outside its valid range.
    #[error("{name} must be within {range}, got {value}")]
    InvalidProbability {
        /// Parameter name (e.g. `"spread_probability"`)
        name: &'static str,
        /// Valid range, human readable
        range: &'static str,
        /// Rejected value
        value: f64,
    },

    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The drone cannot take off from a burning cell.
    #[error("cannot start at {0}: the cell is on fire")]
    StartOnFire(Position),
}

/// Failure delivering a report to the remote observer.
///
/// Reporting is best effort: the controller logs these and keeps flying.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Transport failed after exhausting retries.
    #[error("report transport failed: {0}")]
    Io(#[from] io::Error),

    /// The outgoing queue was full and the event was dropped.
    #[error("report queue is full, event dropped")]
    QueueFull,

    /// The receiving side is gone.
    #[error("report channel closed")]
    Closed,

    /// The event cannot be expressed in the wire format.
    #[error(transparent)]
    Encode(#[from] WireError),
}

/// Failure encoding or decoding the wire protocol.
#[derive(Debug, Error)]
pub enum WireError {
    /// Underlying stream error
    #[error("wire i/o error: {0}")]
    Io(#[from] io::Error),

    /// A text report line could not be parsed.
    #[error("malformed report line: {line:?}")]
    Malformed {
        /// The offending line without its terminator
        line: String,
    },

    /// A world handoff byte is neither clear nor fire.
    #[error("unknown cell code {code:#04x} at cell index {index}")]
    UnknownCellCode {
        /// The raw byte
        code: u8,
        /// Row-major index of the cell
        index: usize,
    },

    /// The world handoff header carried unusable dimensions.
    #[error("invalid world header {rows}x{cols}")]
    InvalidHeader {
        /// Raw row count
        rows: i32,
        /// Raw column count
        cols: i32,
    },

    /// A reported coordinate was negative.
    #[error("negative coordinate ({row}, {col}) in report")]
    NegativeCoordinate {
        /// Raw row
        row: i32,
        /// Raw column
        col: i32,
    },

    /// A position too large for the `i32` wire coordinates.
    #[error("position {0} does not fit in a report")]
    CoordinateOverflow(Position),

    /// The decoded grid was rejected.
    #[error(transparent)]
    Grid(#[from] ScoutError),
}
