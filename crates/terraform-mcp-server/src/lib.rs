//! Terraform MCP server over stdio.
//!
//! The server speaks newline-delimited JSON-RPC 2.0 on stdin and stdout. A
//! lifecycle supervisor runs the message loop on its own thread and races it
//! against process interruption: whichever finishes first decides the exit
//! status, and shutdown always releases the interrupt listener and closes the
//! telemetry sink exactly once.
//!
//! The crate is split along the session's moving parts:
//!
//! - [`transport`]: stream pairs, the optional recording tap and the
//!   read-dispatch-write loop.
//! - [`dispatch`]: JSON-RPC decoding, MCP method routing and the tool
//!   registry.
//! - [`process`]: the shutdown token, interrupt listeners and the supervisor.
//! - [`telemetry`]: the background usage-event sink.
//!
//! Logging is configured once per process through [`initialise_logging`].

pub mod build_info;
pub mod dispatch;
mod logging;
pub mod process;
pub mod telemetry;
pub mod transport;

pub use build_info::{BuildInfo, SERVER_NAME};
pub use dispatch::{Dispatcher, Tool, ToolDescriptor, ToolError, ToolRegistry};
pub use logging::{LoggingError, LoggingHandle, initialise as initialise_logging};
pub use process::{LaunchError, ShutdownReason, ShutdownToken, run_stdio_server};
pub use telemetry::{CloseOutcome, TelemetrySink};

#[cfg(test)]
mod tests;
