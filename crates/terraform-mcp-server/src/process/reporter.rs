//! Structured reporting for server lifecycle events.

use std::io::{self, Write};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::telemetry::CloseOutcome;
use crate::transport::TransportError;

use super::PROCESS_TARGET;

/// Banner written to stderr once the message loop is running.
pub const RUNNING_BANNER: &str = "Terraform MCP Server running on stdio";

/// Phases of a server run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum LifecycleState {
    /// Collaborators are being wired and the interrupt listener installed.
    Initializing,
    /// The message loop is serving requests.
    Running,
    /// A shutdown trigger arrived; resources are being released.
    ShuttingDown,
    /// The run has finished.
    Terminated,
}

/// Observer for lifecycle transitions.
pub trait LifecycleReporter: Send + Sync {
    /// Invoked on every state transition.
    fn state_changed(&self, state: LifecycleState);

    /// Invoked once the message loop has started.
    fn listening(&self);

    /// Invoked when an interruption wins the shutdown race.
    fn interrupted(&self);

    /// Invoked when the message loop ended with a transport failure.
    fn transport_failed(&self, error: &TransportError);

    /// Invoked after the telemetry sink has been closed.
    fn telemetry_closed(&self, outcome: CloseOutcome);
}

impl<T> LifecycleReporter for Arc<T>
where
    T: LifecycleReporter + ?Sized,
{
    fn state_changed(&self, state: LifecycleState) {
        (**self).state_changed(state);
    }

    fn listening(&self) {
        (**self).listening();
    }

    fn interrupted(&self) {
        (**self).interrupted();
    }

    fn transport_failed(&self, error: &TransportError) {
        (**self).transport_failed(error);
    }

    fn telemetry_closed(&self, outcome: CloseOutcome) {
        (**self).telemetry_closed(outcome);
    }
}

/// Default reporter that records lifecycle events using `tracing` and prints
/// the running banner to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredLifecycleReporter;

impl StructuredLifecycleReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl LifecycleReporter for StructuredLifecycleReporter {
    fn state_changed(&self, state: LifecycleState) {
        info!(
            target: PROCESS_TARGET,
            event = "state_changed",
            state = %state,
            "lifecycle state changed"
        );
    }

    fn listening(&self) {
        if let Err(source) = writeln!(io::stderr().lock(), "{RUNNING_BANNER}") {
            warn!(target: PROCESS_TARGET, error = %source, "failed to write banner");
        }
        info!(target: PROCESS_TARGET, event = "listening", "serving MCP over stdio");
    }

    fn interrupted(&self) {
        info!(
            target: PROCESS_TARGET,
            event = "interrupted",
            "interruption received; shutting down"
        );
    }

    fn transport_failed(&self, error: &TransportError) {
        error!(
            target: PROCESS_TARGET,
            event = "transport_failed",
            error = %error,
            "message loop failed"
        );
    }

    fn telemetry_closed(&self, outcome: CloseOutcome) {
        match outcome {
            CloseOutcome::Flushed | CloseOutcome::AlreadyClosed => info!(
                target: PROCESS_TARGET,
                event = "telemetry_closed",
                outcome = %outcome,
                "telemetry closed"
            ),
            CloseOutcome::TimedOut | CloseOutcome::WorkerLost => warn!(
                target: PROCESS_TARGET,
                event = "telemetry_closed",
                outcome = %outcome,
                "telemetry did not flush cleanly"
            ),
        }
    }
}
