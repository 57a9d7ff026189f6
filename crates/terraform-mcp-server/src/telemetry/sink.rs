//! Channel-fed telemetry worker with a single bounded close.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::{EventDestination, TELEMETRY_TARGET, TelemetryError, TelemetryEvent};

/// Result of [`TelemetrySink::close`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CloseOutcome {
    /// Every accepted event was delivered and the destination flushed.
    Flushed,
    /// The flush timeout elapsed first; the worker was left to finish alone.
    TimedOut,
    /// The worker stopped without confirming the flush.
    WorkerLost,
    /// The sink had already been closed; nothing was done.
    AlreadyClosed,
}

struct Worker {
    done: Receiver<()>,
    thread: JoinHandle<()>,
}

/// Background telemetry emitter.
///
/// [`track`](Self::track) hands events to a worker thread and returns
/// immediately; it may be called from any thread. After [`close`](Self::close)
/// begins, further events are dropped.
pub struct TelemetrySink {
    sender: Mutex<Option<Sender<TelemetryEvent>>>,
    worker: Mutex<Option<Worker>>,
    closed: AtomicBool,
    flush_timeout: Duration,
}

impl std::fmt::Debug for TelemetrySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetrySink")
            .field("closed", &self.is_closed())
            .field("flush_timeout", &self.flush_timeout)
            .finish_non_exhaustive()
    }
}

impl TelemetrySink {
    /// Starts the worker thread feeding `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Spawn`] when the worker thread cannot start.
    pub fn spawn<D>(destination: D, flush_timeout: Duration) -> Result<Self, TelemetryError>
    where
        D: EventDestination,
    {
        let (sender, events) = mpsc::channel();
        let (done_tx, done) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("telemetry".to_owned())
            .spawn(move || run_worker(destination, &events, &done_tx))
            .map_err(|source| TelemetryError::Spawn { source })?;
        Ok(Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(Worker { done, thread })),
            closed: AtomicBool::new(false),
            flush_timeout,
        })
    }

    /// Queues an event for delivery. Never blocks on the destination.
    pub fn track(&self, name: &str, attributes: Map<String, Value>) {
        if self.is_closed() {
            debug!(target: TELEMETRY_TARGET, event = name, "sink closed; event dropped");
            return;
        }
        let guard = lock(&self.sender);
        let Some(sender) = guard.as_ref() else {
            debug!(target: TELEMETRY_TARGET, event = name, "sink closed; event dropped");
            return;
        };
        if sender.send(TelemetryEvent::new(name, attributes)).is_err() {
            warn!(target: TELEMETRY_TARGET, event = name, "telemetry worker is gone; event dropped");
        }
    }

    /// Whether [`close`](Self::close) has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stops intake and waits for the worker to drain and flush.
    ///
    /// Waits at most the flush timeout given to [`spawn`](Self::spawn). Only
    /// the first call does any work; later calls return
    /// [`CloseOutcome::AlreadyClosed`].
    #[must_use]
    pub fn close(&self) -> CloseOutcome {
        if self.closed.swap(true, Ordering::AcqRel) {
            return CloseOutcome::AlreadyClosed;
        }
        // Dropping the last sender ends the worker's receive loop once the
        // queue is drained.
        drop(lock(&self.sender).take());

        let Some(Worker { done, thread }) = lock(&self.worker).take() else {
            return CloseOutcome::AlreadyClosed;
        };
        match done.recv_timeout(self.flush_timeout) {
            Ok(()) => {
                if thread.join().is_err() {
                    warn!(target: TELEMETRY_TARGET, "telemetry worker panicked after flushing");
                }
                debug!(target: TELEMETRY_TARGET, "telemetry flushed");
                CloseOutcome::Flushed
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    target: TELEMETRY_TARGET,
                    timeout_ms = self.flush_timeout.as_millis(),
                    "telemetry flush timed out"
                );
                CloseOutcome::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!(target: TELEMETRY_TARGET, "telemetry worker stopped before flushing");
                CloseOutcome::WorkerLost
            }
        }
    }
}

fn run_worker<D>(mut destination: D, events: &Receiver<TelemetryEvent>, done: &Sender<()>)
where
    D: EventDestination,
{
    for event in events {
        if let Err(error) = destination.deliver(&event) {
            warn!(
                target: TELEMETRY_TARGET,
                event = event.name(),
                %error,
                "telemetry event not delivered"
            );
        }
    }
    if let Err(error) = destination.flush() {
        warn!(target: TELEMETRY_TARGET, %error, "telemetry flush failed");
    }
    if done.send(()).is_err() {
        debug!(target: TELEMETRY_TARGET, "close stopped waiting before the flush completed");
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
