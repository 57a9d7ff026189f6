//! Destinations that receive telemetry events from the sink worker.

use thiserror::Error;
use tracing::info;

use super::{ANALYTICS_TARGET, TelemetryEvent};

/// Receives events on the sink's worker thread.
///
/// Implementations may block; the sink isolates callers of
/// [`TelemetrySink::track`](super::TelemetrySink::track) from delivery latency.
pub trait EventDestination: Send + 'static {
    /// Delivers a single event.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] when the event could not be delivered. The
    /// sink logs the failure and carries on with the next event.
    fn deliver(&mut self, event: &TelemetryEvent) -> Result<(), DeliveryError>;

    /// Flushes anything buffered by the destination.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] when buffered events could not be written.
    fn flush(&mut self) -> Result<(), DeliveryError>;
}

/// Failure reported by an [`EventDestination`].
#[derive(Debug, Error)]
#[error("telemetry delivery failed: {message}")]
pub struct DeliveryError {
    message: String,
}

impl DeliveryError {
    /// Builds a delivery error with a description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Writes each event as a structured `tracing` record on [`ANALYTICS_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDestination;

impl EventDestination for TracingDestination {
    fn deliver(&mut self, event: &TelemetryEvent) -> Result<(), DeliveryError> {
        let attributes = serde_json::to_string(event.attributes())
            .map_err(|error| DeliveryError::new(error.to_string()))?;
        info!(
            target: ANALYTICS_TARGET,
            event = event.name(),
            attributes = %attributes,
            "telemetry event"
        );
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DeliveryError> {
        Ok(())
    }
}
