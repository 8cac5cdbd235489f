//! Bounded asynchronous reporting
//!
//! [`ChannelReporter`] hands events to a worker thread through a bounded
//! queue so a slow transport never stalls the mission loop. When the queue is
//! full the event is dropped and [`ReportError::QueueFull`] is returned; the
//! end-of-mission signal alone waits for room.

use super::{DiscoveredFireEvent, Reporter};
use crate::error::ReportError;
use crate::mission::MissionOutcome;
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

enum Envelope {
    Fire(DiscoveredFireEvent),
    End(MissionOutcome),
}

/// Queue in front of another reporter, drained by a dedicated thread
pub struct ChannelReporter<R: Reporter + Send + 'static> {
    sender: Option<SyncSender<Envelope>>,
    worker: Option<JoinHandle<R>>,
}

impl<R: Reporter + Send + 'static> ChannelReporter<R> {
    /// Spawn the worker. `capacity` is clamped to at least one slot.
    ///
    /// # Errors
    /// Returns [`ReportError::Io`] if the thread cannot be spawned.
    pub fn spawn(mut inner: R, capacity: usize) -> Result<Self, ReportError> {
        let (sender, receiver) = mpsc::sync_channel::<Envelope>(capacity.max(1));

        let worker = thread::Builder::new()
            .name("fire-reporter".to_string())
            .spawn(move || {
                let mut delivered = 0u64;
                for envelope in receiver {
                    match envelope {
                        Envelope::Fire(event) => match inner.report_fire(&event) {
                            Ok(()) => delivered += 1,
                            Err(e) => warn!("Queued report for {} failed: {}", event.position, e),
                        },
                        Envelope::End(outcome) => {
                            if let Err(e) = inner.report_end(outcome) {
                                warn!("Queued end of mission failed: {}", e);
                            }
                        }
                    }
                }
                debug!("Report worker exiting after {} deliveries", delivered);
                inner
            })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }

    /// Close the queue, wait for the worker to drain it, and return the inner
    /// reporter.
    ///
    /// # Errors
    /// Returns [`ReportError::Closed`] if the worker panicked.
    pub fn shutdown(mut self) -> Result<R, ReportError> {
        self.sender.take();
        let worker = self.worker.take().ok_or(ReportError::Closed)?;
        worker.join().map_err(|_| ReportError::Closed)
    }
}

impl<R: Reporter + Send + 'static> Reporter for ChannelReporter<R> {
    fn report_fire(&mut self, event: &DiscoveredFireEvent) -> Result<(), ReportError> {
        let sender = self.sender.as_ref().ok_or(ReportError::Closed)?;
        sender
            .try_send(Envelope::Fire(*event))
            .map_err(|e| match e {
                TrySendError::Full(_) => ReportError::QueueFull,
                TrySendError::Disconnected(_) => ReportError::Closed,
            })
    }

    fn report_end(&mut self, outcome: MissionOutcome) -> Result<(), ReportError> {
        let sender = self.sender.as_ref().ok_or(ReportError::Closed)?;
        sender
            .send(Envelope::End(outcome))
            .map_err(|_| ReportError::Closed)
    }
}

impl<R: Reporter + Send + 'static> Drop for ChannelReporter<R> {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Report worker panicked");
            }
        }
    }
}
