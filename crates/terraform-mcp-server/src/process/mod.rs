//! Lifecycle supervision for a stdio session.
//!
//! The supervisor wires the telemetry sink, the interrupt listener and the
//! message loop together, waits for whichever of interruption or loop
//! termination happens first, and then tears everything down in a fixed
//! order: cancel the token, release the listener, close telemetry once.

use std::time::Duration;

mod errors;
pub(crate) mod launch;
mod reporter;
mod shutdown;

pub use errors::LaunchError;
pub use launch::{ShutdownReason, run_stdio_server};
pub use reporter::{LifecycleReporter, LifecycleState, RUNNING_BANNER, StructuredLifecycleReporter};
pub use shutdown::{
    InterruptGuard, InterruptListener, ShutdownError, ShutdownToken, SignalInterruptListener,
};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::process");

/// Upper bound on how long shutdown waits for telemetry to flush.
pub const TELEMETRY_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);
