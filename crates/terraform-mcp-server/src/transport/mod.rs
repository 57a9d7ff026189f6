//! Stdio transport for the MCP session.
//!
//! The transport reads newline-delimited frames from the input half of a
//! [`StreamPair`], hands each frame to a [`MessageHandler`] and writes the
//! response to the output half. [`RecordingTap`] optionally sits between the
//! raw streams and the loop to record every byte.

mod errors;
mod framing;
mod handler;
mod listener;
mod streams;
mod tap;

pub use self::errors::TransportError;
pub use self::handler::MessageHandler;
pub use self::listener::{TransportSession, serve};
pub use self::streams::{BoxedReader, BoxedWriter, StreamPair};
pub use self::tap::{Direction, Recorder, RecordingTap, TappedReader, TappedWriter, TracingRecorder};

pub(crate) use self::framing::MAX_MESSAGE_BYTES;

const LISTENER_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::transport");

/// Target of the command log written by [`TracingRecorder`].
pub const COMMANDS_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::commands");
