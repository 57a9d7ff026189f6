//! Method routing for decoded requests.
//!
//! The [`Dispatcher`] implements the subset of MCP needed to list and call
//! tools. Every failure, including a panicking tool, becomes a JSON-RPC error
//! response so the message loop can carry on with the next request.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use terraform_mcp_config::RunConfiguration;

use crate::build_info::{BuildInfo, SERVER_NAME};
use crate::telemetry::{TOOL_CALLED_EVENT, TelemetrySink};
use crate::transport::MessageHandler;

use super::errors::DispatchError;
use super::registry::ToolRegistry;
use super::request::JsonRpcRequest;
use super::response::JsonRpcResponse;
use super::tool::{ToolContext, ToolError, call_result};

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_CRATE_NAME"), "::dispatch");

/// Protocol revision offered when the client requests none, or one the
/// server does not speak.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-06-18";

/// Protocol revisions the server can answer in, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] =
    &[DEFAULT_PROTOCOL_VERSION, "2025-03-26", "2024-11-05"];

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// Routes requests to built-in methods and registered tools.
#[derive(Debug)]
pub struct Dispatcher {
    registry: ToolRegistry,
    config: RunConfiguration,
    telemetry: Arc<TelemetrySink>,
}

impl Dispatcher {
    /// Creates a dispatcher serving `registry` under `config`.
    #[must_use]
    pub const fn new(
        registry: ToolRegistry,
        config: RunConfiguration,
        telemetry: Arc<TelemetrySink>,
    ) -> Self {
        Self {
            registry,
            config,
            telemetry,
        }
    }

    /// Routes a decoded request to its handler.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] describing why the request failed.
    pub fn dispatch(&self, request: &JsonRpcRequest) -> Result<Value, DispatchError> {
        match request.method() {
            "initialize" => Ok(Self::initialize(request.params())),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(self.list_tools()),
            "tools/call" => self.call_tool(request.params()),
            method if method.starts_with("notifications/") => Ok(Value::Null),
            method => Err(DispatchError::method_not_found(method)),
        }
    }

    fn initialize(params: Option<&Value>) -> Value {
        let protocol_version = params
            .and_then(|value| value.get("protocolVersion"))
            .and_then(Value::as_str)
            .filter(|requested| SUPPORTED_PROTOCOL_VERSIONS.contains(requested))
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);
        json!({
            "protocolVersion": protocol_version,
            "capabilities": { "tools": { "listChanged": false } },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": BuildInfo::current().version,
            },
        })
    }

    fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self
            .registry
            .visible(&self.config)
            .map(|tool| tool.descriptor().listing())
            .collect();
        json!({ "tools": tools })
    }

    fn call_tool(&self, params: Option<&Value>) -> Result<Value, DispatchError> {
        let raw = params.ok_or_else(|| DispatchError::invalid_params("missing params"))?;
        let CallToolParams { name, arguments } = serde_json::from_value(raw.clone())
            .map_err(|error| DispatchError::invalid_params(error.to_string()))?;
        let tool = self
            .registry
            .lookup(&name, &self.config)
            .ok_or_else(|| DispatchError::unknown_tool(&name))?;

        let context = ToolContext::new(&self.config, &self.telemetry);
        let input = arguments.unwrap_or_else(|| json!({}));
        debug!(target: DISPATCH_TARGET, tool = %name, "calling tool");
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| tool.call(input, &context)));

        let result = match outcome {
            Ok(Ok(output)) => Ok(call_result(output, false)),
            Ok(Err(ToolError::Failed { message })) => {
                warn!(target: DISPATCH_TARGET, tool = %name, error = %message, "tool failed");
                Ok(call_result(Value::String(message), true))
            }
            Ok(Err(error @ ToolError::InvalidArguments { .. })) => {
                Err(DispatchError::invalid_params(error.to_string()))
            }
            Err(payload) => Err(DispatchError::handler_panicked(
                format!("tools/call {name}"),
                panic_message(payload.as_ref()),
            )),
        };
        let success = matches!(&result, Ok(value) if value.get("isError") == Some(&Value::Bool(false)));
        self.track_call(&name, success);
        result
    }

    fn track_call(&self, tool: &str, success: bool) {
        let mut attributes = Map::new();
        attributes.insert("tool".to_owned(), Value::from(tool));
        attributes.insert("success".to_owned(), Value::from(success));
        self.telemetry.track(TOOL_CALLED_EVENT, attributes);
    }
}

impl MessageHandler for Dispatcher {
    fn handle(&self, frame: &[u8]) -> Option<JsonRpcResponse> {
        let request = match JsonRpcRequest::parse(frame) {
            Ok(request) => request,
            Err(rejection) => {
                warn!(target: DISPATCH_TARGET, error = %rejection.error(), "rejected request");
                return Some(rejection.into_response());
            }
        };

        debug!(target: DISPATCH_TARGET, method = request.method(), "dispatching request");
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(&request)))
            .unwrap_or_else(|payload| {
                Err(DispatchError::handler_panicked(
                    request.method(),
                    panic_message(payload.as_ref()),
                ))
            });

        let Some(id) = request.id() else {
            if let Err(error) = outcome {
                debug!(
                    target: DISPATCH_TARGET,
                    method = request.method(),
                    %error,
                    "notification failed"
                );
            }
            return None;
        };
        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id.clone(), result),
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    method = request.method(),
                    code = error.code(),
                    %error,
                    "request failed"
                );
                JsonRpcResponse::failure(id.clone(), &error)
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_owned();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "non-string panic payload".to_owned()
}
