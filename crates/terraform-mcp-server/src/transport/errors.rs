//! Error types for the message loop.

use std::io;

use thiserror::Error;

/// Unrecoverable failures that end a transport session.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Reading from the input stream failed.
    #[error("failed to read from transport input: {source}")]
    Read {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// A response could not be serialised.
    #[error("failed to serialise response: {source}")]
    Serialize {
        /// Underlying serialisation error.
        #[source]
        source: serde_json::Error,
    },
    /// Writing a response to the output stream failed.
    #[error("failed to write to transport output: {source}")]
    Write {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Flushing the output stream failed.
    #[error("failed to flush transport output: {source}")]
    Flush {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The message loop thread panicked.
    #[error("message loop panicked")]
    LoopPanicked,
}
