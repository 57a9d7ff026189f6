//! Error types for request dispatch failures.
//!
//! Every variant maps onto a JSON-RPC error code. None of them end the
//! session; the message loop answers with an error response and moves on.

use thiserror::Error;

/// JSON-RPC code for unparseable JSON.
pub const PARSE_ERROR: i64 = -32_700;
/// JSON-RPC code for a structurally invalid request.
pub const INVALID_REQUEST: i64 = -32_600;
/// JSON-RPC code for an unknown method.
pub const METHOD_NOT_FOUND: i64 = -32_601;
/// JSON-RPC code for invalid method parameters.
pub const INVALID_PARAMS: i64 = -32_602;
/// JSON-RPC code for a failure inside the server.
pub const INTERNAL_ERROR: i64 = -32_603;

/// Errors surfaced while parsing and routing a single request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The frame was not valid JSON.
    #[error("malformed JSON: {message}")]
    MalformedJson {
        /// Parser message.
        message: String,
        /// Underlying parser error.
        #[source]
        source: Option<serde_json::Error>,
    },
    /// The JSON did not form a valid JSON-RPC request.
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// What was wrong.
        message: String,
    },
    /// No handler exists for the method.
    #[error("method not found: {method}")]
    MethodNotFound {
        /// Requested method.
        method: String,
    },
    /// The parameters did not match what the method expects.
    #[error("invalid params: {message}")]
    InvalidParams {
        /// What was wrong.
        message: String,
    },
    /// The named tool is not registered or not visible.
    #[error("unknown tool: {name}")]
    UnknownTool {
        /// Requested tool name.
        name: String,
    },
    /// A handler panicked while serving the request.
    #[error("handler for '{method}' panicked: {message}")]
    HandlerPanicked {
        /// Method being served.
        method: String,
        /// Panic payload, when it was a string.
        message: String,
    },
    /// Any other server-side failure.
    #[error("internal error: {message}")]
    Internal {
        /// What went wrong.
        message: String,
    },
}

impl DispatchError {
    /// Returns the JSON-RPC error code for this error.
    #[must_use]
    pub const fn code(&self) -> i64 {
        match self {
            Self::MalformedJson { .. } => PARSE_ERROR,
            Self::InvalidRequest { .. } => INVALID_REQUEST,
            Self::MethodNotFound { .. } => METHOD_NOT_FOUND,
            Self::InvalidParams { .. } | Self::UnknownTool { .. } => INVALID_PARAMS,
            Self::HandlerPanicked { .. } | Self::Internal { .. } => INTERNAL_ERROR,
        }
    }

    /// Creates a malformed JSON error from a serde error.
    #[must_use]
    pub fn from_json_error(source: serde_json::Error) -> Self {
        Self::MalformedJson {
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Creates an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a method not found error.
    #[must_use]
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::MethodNotFound {
            method: method.into(),
        }
    }

    /// Creates an invalid params error.
    #[must_use]
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    /// Creates an unknown tool error.
    #[must_use]
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool { name: name.into() }
    }

    /// Creates a handler panic error.
    #[must_use]
    pub fn handler_panicked(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HandlerPanicked {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
