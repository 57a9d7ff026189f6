//! Response serialisation helpers for the message loop.
//!
//! This module provides the JSON-RPC response envelope and the
//! [`ResponseWriter`] that frames responses as JSONL. Each response is written
//! with a single `write_all` and flushed before the loop reads the next
//! request.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::transport::TransportError;

use super::errors::DispatchError;
use super::request::JSONRPC_VERSION;

/// Error object carried by a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl JsonRpcError {
    /// Error code.
    #[must_use]
    pub const fn code(&self) -> i64 {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&DispatchError> for JsonRpcError {
    fn from(error: &DispatchError) -> Self {
        let data = match error {
            DispatchError::MethodNotFound { method } => Some(serde_json::json!({ "method": method })),
            DispatchError::UnknownTool { name } => Some(serde_json::json!({ "tool": name })),
            _ => None,
        };
        Self {
            code: error.code(),
            message: error.to_string(),
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Outcome {
    Result(Value),
    Error(JsonRpcError),
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: &'static str,
    id: Value,
    #[serde(flatten)]
    outcome: Outcome,
}

impl JsonRpcResponse {
    /// Creates a successful response.
    #[must_use]
    pub const fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Result(result),
        }
    }

    /// Creates an error response.
    #[must_use]
    pub fn failure(id: Value, error: &DispatchError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Error(JsonRpcError::from(error)),
        }
    }

    /// Id of the request being answered.
    #[must_use]
    pub const fn id(&self) -> &Value {
        &self.id
    }

    /// Result payload, for successful responses.
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Result(result) => Some(result),
            Outcome::Error(_) => None,
        }
    }

    /// Error object, for failed responses.
    #[must_use]
    pub const fn error(&self) -> Option<&JsonRpcError> {
        match &self.outcome {
            Outcome::Result(_) => None,
            Outcome::Error(error) => Some(error),
        }
    }
}

/// Writer that serialises responses to the output stream.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Creates a new response writer wrapping the given output stream.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes a response as one JSONL line and flushes the stream.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if serialisation, writing or flushing
    /// fails.
    pub fn write_response(&mut self, response: &JsonRpcResponse) -> Result<(), TransportError> {
        let mut line =
            serde_json::to_vec(response).map_err(|source| TransportError::Serialize { source })?;
        line.push(b'\n');
        self.writer
            .write_all(&line)
            .map_err(|source| TransportError::Write { source })?;
        self.writer
            .flush()
            .map_err(|source| TransportError::Flush { source })
    }
}
