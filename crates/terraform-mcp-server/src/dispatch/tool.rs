//! Tool abstraction consumed by the dispatcher.

use serde_json::{Value, json};
use thiserror::Error;

use terraform_mcp_config::RunConfiguration;

use crate::telemetry::TelemetrySink;

/// Static description of a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    toolset: String,
    read_only: bool,
    input_schema: Value,
}

impl ToolDescriptor {
    /// Describes a tool belonging to `toolset`.
    ///
    /// Tools start out as mutating with an empty object schema.
    #[must_use]
    pub fn new(name: impl Into<String>, toolset: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            toolset: toolset.into().to_ascii_lowercase(),
            read_only: false,
            input_schema: json!({ "type": "object" }),
        }
    }

    /// Sets the description shown to clients.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Marks the tool as free of side effects.
    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Sets the JSON schema for the tool's arguments.
    #[must_use]
    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Toolset the tool belongs to.
    #[must_use]
    pub fn toolset(&self) -> &str {
        &self.toolset
    }

    /// Whether the tool is annotated as read-only.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Entry returned by `tools/list`.
    #[must_use]
    pub fn listing(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema,
            "annotations": { "readOnlyHint": self.read_only },
        })
    }
}

/// Ambient state available to a tool invocation.
#[derive(Debug, Clone, Copy)]
pub struct ToolContext<'a> {
    config: &'a RunConfiguration,
    telemetry: &'a TelemetrySink,
}

impl<'a> ToolContext<'a> {
    pub(crate) const fn new(config: &'a RunConfiguration, telemetry: &'a TelemetrySink) -> Self {
        Self { config, telemetry }
    }

    /// Configuration snapshot of the running server.
    #[must_use]
    pub const fn config(&self) -> &'a RunConfiguration {
        self.config
    }

    /// Telemetry sink for tool-specific events.
    #[must_use]
    pub const fn telemetry(&self) -> &'a TelemetrySink {
        self.telemetry
    }
}

/// Failure reported by a tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The arguments did not match the tool's schema.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        /// What was wrong.
        message: String,
    },
    /// The tool ran but could not complete.
    #[error("{message}")]
    Failed {
        /// Message reported to the client.
        message: String,
    },
}

impl ToolError {
    /// Creates an invalid arguments error.
    #[must_use]
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }

    /// Creates an execution failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// A remote-invocable tool.
pub trait Tool: Send + Sync {
    /// Static description used for listing and visibility.
    fn descriptor(&self) -> &ToolDescriptor;

    /// Runs the tool.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] for arguments the tool cannot
    /// use and [`ToolError::Failed`] when execution fails.
    fn call(&self, arguments: Value, context: &ToolContext<'_>) -> Result<Value, ToolError>;
}

/// Wraps a tool's output in the MCP call result shape.
pub(crate) fn call_result(output: Value, is_error: bool) -> Value {
    let text = match &output {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    let mut result = json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    });
    if output.is_object() {
        if let Some(fields) = result.as_object_mut() {
            fields.insert("structuredContent".to_owned(), output);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptors_default_to_mutating_tools() {
        let descriptor = ToolDescriptor::new("create_run", "Workspaces");
        assert_eq!(descriptor.toolset(), "workspaces");
        assert!(!descriptor.is_read_only());
        assert_eq!(
            descriptor.listing()["annotations"]["readOnlyHint"],
            json!(false)
        );
    }

    #[test]
    fn string_output_becomes_text_content() {
        let result = call_result(json!("done"), false);
        assert_eq!(result["content"][0]["text"], json!("done"));
        assert_eq!(result["isError"], json!(false));
        assert!(result.get("structuredContent").is_none());
    }

    #[test]
    fn object_output_is_also_structured() {
        let result = call_result(json!({"count": 2}), false);
        assert_eq!(result["content"][0]["text"], json!("{\"count\":2}"));
        assert_eq!(result["structuredContent"], json!({"count": 2}));
    }
}
