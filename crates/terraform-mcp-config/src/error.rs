use thiserror::Error;

/// Errors surfaced while resolving the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Command-line parsing failed, or help/version output was requested.
    #[error(transparent)]
    Cli(clap::Error),
    /// A toolset entry was empty after trimming.
    #[error("toolset names must not be empty (got {raw:?})")]
    EmptyToolset {
        /// Raw toolset list as supplied.
        raw: Vec<String>,
    },
    /// The log filter expression was empty.
    #[error("log filter must not be empty")]
    EmptyLogFilter,
}
