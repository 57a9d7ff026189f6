//! Test double for [`LifecycleReporter`] that records events for assertions.

use std::sync::Mutex;

use crate::process::{LifecycleReporter, LifecycleState};
use crate::telemetry::CloseOutcome;
use crate::transport::TransportError;

/// Lifecycle events observed during a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A state transition.
    State(LifecycleState),
    /// The loop started serving.
    Listening,
    /// An interruption won the shutdown race.
    Interrupted,
    /// The loop failed with the given message.
    TransportFailed(String),
    /// The telemetry sink was closed.
    TelemetryClosed(CloseOutcome),
}

/// Records lifecycle events in arrival order.
#[derive(Debug, Default)]
pub struct RecordingLifecycleReporter {
    events: Mutex<Vec<LifecycleEvent>>,
}

impl RecordingLifecycleReporter {
    /// Captures a copy of the recorded events.
    pub fn events(&self) -> Vec<LifecycleEvent> {
        self.events
            .lock()
            .expect("lifecycle reporter mutex poisoned")
            .clone()
    }

    /// The state transitions, in order.
    pub fn states(&self) -> Vec<LifecycleState> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                LifecycleEvent::State(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    /// Outcomes of every telemetry close reported.
    pub fn telemetry_closes(&self) -> Vec<CloseOutcome> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                LifecycleEvent::TelemetryClosed(outcome) => Some(outcome),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: LifecycleEvent) {
        self.events
            .lock()
            .expect("lifecycle reporter mutex poisoned")
            .push(event);
    }
}

impl LifecycleReporter for RecordingLifecycleReporter {
    fn state_changed(&self, state: LifecycleState) {
        self.record(LifecycleEvent::State(state));
    }

    fn listening(&self) {
        self.record(LifecycleEvent::Listening);
    }

    fn interrupted(&self) {
        self.record(LifecycleEvent::Interrupted);
    }

    fn transport_failed(&self, error: &TransportError) {
        self.record(LifecycleEvent::TransportFailed(error.to_string()));
    }

    fn telemetry_closed(&self, outcome: CloseOutcome) {
        self.record(LifecycleEvent::TelemetryClosed(outcome));
    }
}
