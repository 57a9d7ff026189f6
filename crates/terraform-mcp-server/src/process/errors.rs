//! Defines the error surface for starting and supervising the server.

use std::io;

use thiserror::Error;

use crate::telemetry::TelemetryError;
use crate::transport::TransportError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising a server run.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The interrupt listener could not be installed.
    #[error("failed to install interrupt listener: {source}")]
    Interrupts {
        /// Underlying listener error.
        #[source]
        source: ShutdownError,
    },
    /// The telemetry sink could not be started.
    #[error("failed to start telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The message loop thread could not be spawned.
    #[error("failed to spawn message loop: {source}")]
    Spawn {
        /// Underlying OS error.
        #[source]
        source: io::Error,
    },
    /// The message loop ended with a transport failure.
    #[error("error running server: {source}")]
    Transport {
        /// Underlying transport error.
        #[source]
        source: TransportError,
    },
}

impl From<ShutdownError> for LaunchError {
    fn from(source: ShutdownError) -> Self {
        Self::Interrupts { source }
    }
}

impl From<TelemetryError> for LaunchError {
    fn from(source: TelemetryError) -> Self {
        Self::Telemetry { source }
    }
}

impl From<TransportError> for LaunchError {
    fn from(source: TransportError) -> Self {
        Self::Transport { source }
    }
}
