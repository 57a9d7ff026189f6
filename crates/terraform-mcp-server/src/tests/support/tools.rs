//! Tools registered by the behavioural suites.

use serde_json::{Value, json};

use crate::dispatch::{Tool, ToolContext, ToolDescriptor, ToolError, ToolRegistry};

/// What a [`FixtureTool`] does when called.
#[derive(Debug, Clone, Copy)]
pub enum Behaviour {
    /// Returns its arguments.
    Echo,
    /// Reports a tool-level failure.
    Fail,
}

/// Tool with a fixed descriptor and behaviour.
#[derive(Debug)]
pub struct FixtureTool {
    descriptor: ToolDescriptor,
    behaviour: Behaviour,
}

impl FixtureTool {
    /// Builds a tool in `toolset`.
    pub fn new(name: &str, toolset: &str, behaviour: Behaviour) -> Self {
        Self {
            descriptor: ToolDescriptor::new(name, toolset)
                .with_description(format!("{name} fixture")),
            behaviour,
        }
    }

    /// Marks the tool read-only.
    pub fn read_only(self) -> Self {
        Self {
            descriptor: self.descriptor.read_only(),
            behaviour: self.behaviour,
        }
    }
}

impl Tool for FixtureTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn call(&self, arguments: Value, _context: &ToolContext<'_>) -> Result<Value, ToolError> {
        match self.behaviour {
            Behaviour::Echo => Ok(json!({ "echo": arguments })),
            Behaviour::Fail => Err(ToolError::failed("terraform registry unavailable")),
        }
    }
}

/// Registry with one read-only and one mutating tool per toolset, plus a
/// tool that always fails.
pub fn fixture_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    let tools = [
        FixtureTool::new("search_providers", "registry", Behaviour::Echo).read_only(),
        FixtureTool::new("search_modules", "registry", Behaviour::Echo).read_only(),
        FixtureTool::new("list_workspaces", "workspaces", Behaviour::Echo).read_only(),
        FixtureTool::new("create_workspace", "workspaces", Behaviour::Echo),
        FixtureTool::new("get_policy", "policies", Behaviour::Fail).read_only(),
    ];
    for tool in tools {
        registry.register(tool).expect("fixture tool names are unique");
    }
    registry
}
