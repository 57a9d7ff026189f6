//! Registry of tools exposed to clients.

use std::sync::Arc;

use thiserror::Error;

use terraform_mcp_config::RunConfiguration;

use super::tool::Tool;

/// Errors raised while registering tools.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A tool with the same name is already registered.
    #[error("tool '{name}' is already registered")]
    Duplicate {
        /// Conflicting tool name.
        name: String,
    },
}

/// Ordered collection of tools.
///
/// Which tools a client can see depends on the run configuration: a tool is
/// visible when its toolset is enabled and, in read-only mode, only when it is
/// annotated as read-only.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.tools.iter().map(|tool| tool.descriptor().name()))
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tool.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] when the name is taken.
    pub fn register<T>(&mut self, tool: T) -> Result<(), RegistryError>
    where
        T: Tool + 'static,
    {
        let name = tool.descriptor().name();
        if self
            .tools
            .iter()
            .any(|existing| existing.descriptor().name() == name)
        {
            return Err(RegistryError::Duplicate {
                name: name.to_owned(),
            });
        }
        self.tools.push(Arc::new(tool));
        Ok(())
    }

    /// Number of registered tools, visible or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tools visible under `config`, in registration order.
    pub fn visible<'a>(
        &'a self,
        config: &'a RunConfiguration,
    ) -> impl Iterator<Item = &'a dyn Tool> + 'a {
        self.tools
            .iter()
            .map(|tool| &**tool)
            .filter(move |tool| is_visible(*tool, config))
    }

    /// Finds a visible tool by name.
    #[must_use]
    pub fn lookup<'a>(&'a self, name: &str, config: &'a RunConfiguration) -> Option<&'a dyn Tool> {
        self.visible(config)
            .find(|tool| tool.descriptor().name() == name)
    }
}

fn is_visible(tool: &dyn Tool, config: &RunConfiguration) -> bool {
    let descriptor = tool.descriptor();
    config.toolset_enabled(descriptor.toolset()) && (!config.read_only() || descriptor.is_read_only())
}
