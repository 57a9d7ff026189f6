//! Fire-and-forget usage telemetry.
//!
//! Events are handed to a [`TelemetrySink`], which forwards them to an
//! [`EventDestination`] on a dedicated worker thread. The sink is closed once
//! during shutdown; closing drains every event accepted before the call and
//! flushes the destination, bounded by a timeout.

mod destination;
mod sink;

use std::io;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub use self::destination::{DeliveryError, EventDestination, TracingDestination};
pub use self::sink::{CloseOutcome, TelemetrySink};

pub(crate) const TELEMETRY_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::telemetry");

/// Target of the structured events written by [`TracingDestination`].
pub const ANALYTICS_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::analytics");

/// Event emitted once the server has started.
pub const SERVER_STARTED_EVENT: &str = "mcp_server_started";

/// Event emitted after every tool invocation.
pub const TOOL_CALLED_EVENT: &str = "mcp_tool_called";

/// A named usage event with free-form attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryEvent {
    name: String,
    attributes: Map<String, Value>,
}

impl TelemetryEvent {
    /// Builds an event.
    #[must_use]
    pub fn new(name: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }

    /// Event name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Event attributes.
    #[must_use]
    pub const fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

/// Errors raised while starting the telemetry sink.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The worker thread could not be spawned.
    #[error("failed to spawn telemetry worker: {source}")]
    Spawn {
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
}
