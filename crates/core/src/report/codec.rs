//! Fire report wire formats
//!
//! Two framings are supported:
//!
//! - [`WireFormat::Line`]: ASCII lines `FIRE <row> <col>\n`, closed by `END\n`
//! - [`WireFormat::Binary`]: one 8-byte record per fire, `row` then `col` as
//!   little-endian `i32`. The end of the mission is the end of the stream.

use crate::error::WireError;
use crate::grid::Position;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, ErrorKind};

/// Size of one binary fire record
pub const BINARY_RECORD_LEN: usize = 8;

/// Report framing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WireFormat {
    /// Newline-terminated text
    #[default]
    Line,
    /// Fixed-size little-endian records
    Binary,
}

/// Encode one fire report
///
/// # Errors
/// Returns [`WireError::CoordinateOverflow`] if either coordinate exceeds
/// `i32::MAX`, in either framing, since the decoder reads `i32` back.
pub fn encode_fire(format: WireFormat, pos: Position) -> Result<Vec<u8>, WireError> {
    let (Ok(row), Ok(col)) = (i32::try_from(pos.row), i32::try_from(pos.col)) else {
        return Err(WireError::CoordinateOverflow(pos));
    };

    Ok(match format {
        WireFormat::Line => format!("FIRE {row} {col}\n").into_bytes(),
        WireFormat::Binary => {
            let mut record = Vec::with_capacity(BINARY_RECORD_LEN);
            record.extend_from_slice(&row.to_le_bytes());
            record.extend_from_slice(&col.to_le_bytes());
            record
        }
    })
}

/// Encode the end-of-mission marker. Empty for binary framing.
pub fn encode_end(format: WireFormat) -> Vec<u8> {
    match format {
        WireFormat::Line => b"END\n".to_vec(),
        WireFormat::Binary => Vec::new(),
    }
}

/// A decoded report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMessage {
    /// A cell seen burning
    Fire(Position),
    /// The drone has finished
    End,
}

/// Pulls [`ReportMessage`]s off a byte stream
#[derive(Debug)]
pub struct ReportDecoder<R> {
    reader: R,
    format: WireFormat,
    line: String,
    finished: bool,
}

impl<R: BufRead> ReportDecoder<R> {
    /// Wrap a buffered reader
    pub fn new(reader: R, format: WireFormat) -> Self {
        Self {
            reader,
            format,
            line: String::new(),
            finished: false,
        }
    }

    /// Framing in use
    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Give back the reader
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Next message, `None` at a clean end of stream.
    ///
    /// # Errors
    /// Returns [`WireError`] for unparsable lines, negative coordinates,
    /// truncated binary records and stream failures.
    pub fn next_message(&mut self) -> Result<Option<ReportMessage>, WireError> {
        if self.finished {
            return Ok(None);
        }
        let message = match self.format {
            WireFormat::Line => self.next_line()?,
            WireFormat::Binary => self.next_record()?,
        };
        if matches!(message, None | Some(ReportMessage::End)) {
            self.finished = true;
        }
        Ok(message)
    }

    fn next_line(&mut self) -> Result<Option<ReportMessage>, WireError> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            let text = self.line.trim();
            if text.is_empty() {
                continue;
            }
            return parse_line(text).map(Some);
        }
    }

    fn next_record(&mut self) -> Result<Option<ReportMessage>, WireError> {
        if self.reader.fill_buf()?.is_empty() {
            return Ok(None);
        }

        let mut record = [0u8; BINARY_RECORD_LEN];
        self.reader.read_exact(&mut record).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                WireError::Malformed {
                    line: format!("truncated binary record: {e}"),
                }
            } else {
                WireError::Io(e)
            }
        })?;

        let row = i32::from_le_bytes([record[0], record[1], record[2], record[3]]);
        let col = i32::from_le_bytes([record[4], record[5], record[6], record[7]]);
        coordinate(row, col).map(|pos| Some(ReportMessage::Fire(pos)))
    }
}

impl<R: BufRead> Iterator for ReportDecoder<R> {
    type Item = Result<ReportMessage, WireError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_message().transpose()
    }
}

fn parse_line(text: &str) -> Result<ReportMessage, WireError> {
    let malformed = || WireError::Malformed {
        line: text.to_string(),
    };

    let mut parts = text.split_whitespace();
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some("END"), None, None, None) => Ok(ReportMessage::End),
        (Some("FIRE"), Some(row), Some(col), None) => {
            let row: i32 = row.parse().map_err(|_| malformed())?;
            let col: i32 = col.parse().map_err(|_| malformed())?;
            coordinate(row, col).map(ReportMessage::Fire)
        }
        _ => Err(malformed()),
    }
}

fn coordinate(row: i32, col: i32) -> Result<Position, WireError> {
    match (usize::try_from(row), usize::try_from(col)) {
        (Ok(r), Ok(c)) => Ok(Position::new(r, c)),
        _ => Err(WireError::NegativeCoordinate { row, col }),
    }
}
