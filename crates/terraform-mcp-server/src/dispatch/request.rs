//! Request deserialisation for the dispatch loop.
//!
//! Frames are decoded in two steps: first as arbitrary JSON, so that parse
//! errors and structural errors can be told apart, then into the JSON-RPC
//! request envelope. The request id is recovered whenever possible so that
//! rejections can still be correlated by the client.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::errors::DispatchError;
use super::response::JsonRpcResponse;

/// Protocol version every request must declare.
pub const JSONRPC_VERSION: &str = "2.0";

/// A decoded JSON-RPC request or notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonRpcRequest {
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    jsonrpc: String,
    #[serde(default, deserialize_with = "present")]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

/// Distinguishes `"id": null` from a missing id; only the latter marks a
/// notification.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A frame that could not be accepted as a request.
#[derive(Debug)]
pub struct RequestRejection {
    id: Value,
    error: DispatchError,
}

impl RequestRejection {
    fn new(id: Value, error: DispatchError) -> Self {
        Self { id, error }
    }

    /// The error explaining the rejection.
    #[must_use]
    pub const fn error(&self) -> &DispatchError {
        &self.error
    }

    /// Builds the error response sent back to the client.
    #[must_use]
    pub fn into_response(self) -> JsonRpcResponse {
        JsonRpcResponse::failure(self.id, &self.error)
    }
}

impl JsonRpcRequest {
    /// Parses one frame into a request.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestRejection`] carrying a parse error for invalid JSON
    /// and an invalid request error for anything that is not a single JSON-RPC
    /// 2.0 request object.
    pub fn parse(frame: &[u8]) -> Result<Self, RequestRejection> {
        let value: Value = serde_json::from_slice(frame).map_err(|error| {
            RequestRejection::new(Value::Null, DispatchError::from_json_error(error))
        })?;
        match value {
            Value::Object(_) => {}
            Value::Array(_) => {
                return Err(RequestRejection::new(
                    Value::Null,
                    DispatchError::invalid_request("batch requests are not supported"),
                ));
            }
            _ => {
                return Err(RequestRejection::new(
                    Value::Null,
                    DispatchError::invalid_request("request must be a JSON object"),
                ));
            }
        }

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        let raw: RawRequest = serde_json::from_value(value).map_err(|error| {
            RequestRejection::new(id.clone(), DispatchError::invalid_request(error.to_string()))
        })?;
        if raw.jsonrpc != JSONRPC_VERSION {
            return Err(RequestRejection::new(
                id,
                DispatchError::invalid_request(format!(
                    "unsupported jsonrpc version '{}'",
                    raw.jsonrpc
                )),
            ));
        }
        if let Some(request_id) = &raw.id {
            if !(request_id.is_string() || request_id.is_number() || request_id.is_null()) {
                return Err(RequestRejection::new(
                    Value::Null,
                    DispatchError::invalid_request("id must be a string, number or null"),
                ));
            }
        }
        if raw.method.trim().is_empty() {
            return Err(RequestRejection::new(
                id,
                DispatchError::invalid_request("method field is empty"),
            ));
        }

        Ok(Self {
            id: raw.id,
            method: raw.method,
            params: raw.params,
        })
    }

    /// Request id; `None` for notifications.
    #[must_use]
    pub const fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    /// Whether the client expects no response.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Method name.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Raw parameters, if any.
    #[must_use]
    pub const fn params(&self) -> Option<&Value> {
        self.params.as_ref()
    }
}
