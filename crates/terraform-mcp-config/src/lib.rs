//! Configuration surface for the Terraform MCP server.
//!
//! The server resolves everything it needs before the stdio session starts:
//! command-line flags are parsed with `clap`, each flag falling back to a
//! `TERRAFORM_MCP_*` environment variable, and the result is frozen into a
//! [`RunConfiguration`] snapshot that the lifecycle supervisor owns for the
//! rest of the process.

mod cli;
mod defaults;
mod error;
mod logging;
mod run_config;
mod tfe;

pub use cli::{Cli, Command, GlobalOptions, Invocation};
pub use defaults::{
    ALL_TOOLSETS, DEFAULT_LOG_FILTER, FILE_LOG_FILTER, default_log_filter, default_log_format,
    default_toolsets,
};
pub use error::ConfigError;
pub use logging::{LogFormat, LogFormatParseError};
pub use run_config::RunConfiguration;
pub use tfe::{DEFAULT_TFE_ADDRESS, TfeAccess, TfeSettings};
