//! Reporters that write encoded reports onto a byte stream

use super::codec::{encode_end, encode_fire, WireFormat};
use super::{DiscoveredFireEvent, Reporter};
use crate::error::ReportError;
use crate::mission::MissionOutcome;
use std::io::{self, ErrorKind, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Retry settings for transient write failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total tries per message, including the first
    pub max_attempts: u32,
    /// Pause between tries
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(50),
        }
    }
}

impl RetryPolicy {
    /// Try once, never retry
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }
}

fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

/// Writes each report to `W` using the chosen [`WireFormat`]
#[derive(Debug)]
pub struct StreamReporter<W: Write> {
    writer: W,
    format: WireFormat,
    retry: RetryPolicy,
    sent: u64,
}

impl<W: Write> StreamReporter<W> {
    /// Wrap a writer with the default retry policy
    pub fn new(writer: W, format: WireFormat) -> Self {
        Self {
            writer,
            format,
            retry: RetryPolicy::default(),
            sent: 0,
        }
    }

    /// Replace the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Messages written successfully
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), ReportError> {
        let attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.write_message(bytes) {
                Ok(()) => {
                    self.sent += 1;
                    return Ok(());
                }
                Err(e) if is_transient(e.kind()) && attempt < attempts => {
                    debug!(
                        "Report write attempt {}/{} failed: {}, retrying",
                        attempt, attempts, e
                    );
                    attempt += 1;
                    thread::sleep(self.retry.backoff);
                }
                Err(e) => return Err(ReportError::Io(e)),
            }
        }
    }

    fn write_message(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()
    }
}

impl<W: Write> Reporter for StreamReporter<W> {
    fn report_fire(&mut self, event: &DiscoveredFireEvent) -> Result<(), ReportError> {
        let bytes = encode_fire(self.format, event.position)?;
        self.send(&bytes)
    }

    fn report_end(&mut self, outcome: MissionOutcome) -> Result<(), ReportError> {
        let bytes = encode_end(self.format);
        if !bytes.is_empty() {
            self.send(&bytes)?;
        }
        debug!("End of mission sent ({})", outcome.describe());
        Ok(())
    }
}

/// Stream reporter over a TCP connection to a base station
pub type TcpReporter = StreamReporter<TcpStream>;

impl StreamReporter<TcpStream> {
    /// Connect to a base station.
    ///
    /// `write_timeout` bounds each write so a stalled peer surfaces as a
    /// transient error instead of blocking the mission.
    ///
    /// # Errors
    /// Returns [`ReportError::Io`] if the connection cannot be made.
    pub fn connect<A: ToSocketAddrs>(
        addr: A,
        format: WireFormat,
        retry: RetryPolicy,
        write_timeout: Option<Duration>,
    ) -> Result<Self, ReportError> {
        let stream = TcpStream::connect(addr)?;
        Self::from_stream(stream, format, retry, write_timeout)
    }

    /// Report over an already connected stream, e.g. one that first
    /// received the world handoff.
    ///
    /// # Errors
    /// Returns [`ReportError::Io`] if the socket options cannot be set.
    pub fn from_stream(
        stream: TcpStream,
        format: WireFormat,
        retry: RetryPolicy,
        write_timeout: Option<Duration>,
    ) -> Result<Self, ReportError> {
        stream.set_nodelay(true)?;
        stream.set_write_timeout(write_timeout)?;
        match stream.peer_addr() {
            Ok(peer) => info!("Reporting to base station at {}", peer),
            Err(e) => warn!("Reporting to base station (peer address unknown: {})", e),
        }
        Ok(Self::new(stream, format).with_retry(retry))
    }
}
