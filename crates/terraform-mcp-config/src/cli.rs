//! Command-line surface for the server binary.

use std::ffi::OsString;

use camino::Utf8PathBuf;
use clap::{Args, CommandFactory, FromArgMatches, Parser, Subcommand};

use crate::defaults::ALL_TOOLSETS;
use crate::error::ConfigError;
use crate::logging::LogFormat;
use crate::run_config::RunConfiguration;

/// Top-level command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "terraform-mcp-server",
    about = "Terraform MCP Server",
    long_about = "A Terraform MCP server that exposes registry and workspace tools to MCP clients.",
    version
)]
pub struct Cli {
    /// Options shared by every subcommand.
    #[command(flatten)]
    pub options: GlobalOptions,
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands offered by the server binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Start a server that communicates via standard input/output streams
    /// using JSON-RPC messages.
    Stdio,
}

/// Flags accepted by every subcommand.
///
/// Each flag falls back to a `TERRAFORM_MCP_*` environment variable when it is
/// not given on the command line.
#[derive(Debug, Clone, Args)]
pub struct GlobalOptions {
    /// Comma separated list of toolsets to enable; `all` enables every toolset.
    #[arg(
        long,
        global = true,
        env = "TERRAFORM_MCP_TOOLSETS",
        value_delimiter = ',',
        default_value = ALL_TOOLSETS
    )]
    pub toolsets: Vec<String>,
    /// Restrict the server to read-only tools.
    #[arg(long, global = true, env = "TERRAFORM_MCP_READ_ONLY")]
    pub read_only: bool,
    /// Path to the log file; logs go to stderr when unset.
    #[arg(long, global = true, env = "TERRAFORM_MCP_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<Utf8PathBuf>,
    /// Record every byte exchanged over stdio in the log.
    #[arg(long, global = true, env = "TERRAFORM_MCP_ENABLE_COMMAND_LOGGING")]
    pub enable_command_logging: bool,
    /// Log filter expression, for example `info` or `terraform_mcp_server=debug`.
    #[arg(long, global = true, env = "TERRAFORM_MCP_LOG_FILTER")]
    pub log_filter: Option<String>,
    /// Log output format.
    #[arg(long, global = true, env = "TERRAFORM_MCP_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
    /// Enable dynamic toolsets. Accepted for compatibility; toolsets are
    /// fixed at startup.
    #[arg(long, global = true, env = "TERRAFORM_MCP_DYNAMIC_TOOLSETS")]
    pub dynamic_toolsets: bool,
    /// Save translations to a JSON file. Accepted for compatibility; the
    /// server has no translatable strings.
    #[arg(long, global = true, env = "TERRAFORM_MCP_EXPORT_TRANSLATIONS")]
    pub export_translations: bool,
    /// Terraform Enterprise API token.
    #[arg(long, global = true, env = "HCP_TFE_TOKEN", hide_env_values = true)]
    pub tfe_token: Option<String>,
    /// Terraform Enterprise API address.
    #[arg(long, global = true, env = "HCP_TFE_ADDRESS", value_name = "URL")]
    pub tfe_address: Option<String>,
}

/// A parsed invocation: the subcommand and its resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Subcommand selected by the user.
    pub command: Command,
    /// Configuration snapshot for the run.
    pub config: RunConfiguration,
}

impl Invocation {
    /// Parses the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Cli`] for argument errors (including `--help`
    /// and `--version` requests) and other variants when the resolved values
    /// are invalid.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Parses an explicit argument list together with the environment.
    ///
    /// # Errors
    ///
    /// See [`Invocation::load`].
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::parse_with(Cli::command(), args)
    }

    /// Parses the process arguments, answering `--version` with
    /// `long_version`.
    ///
    /// # Errors
    ///
    /// See [`Invocation::load`].
    pub fn load_with_long_version(long_version: impl Into<String>) -> Result<Self, ConfigError> {
        Self::parse_with(
            Cli::command().long_version(long_version.into()),
            std::env::args_os(),
        )
    }

    fn parse_with<I, T>(command: clap::Command, args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = command.try_get_matches_from(args).map_err(ConfigError::Cli)?;
        let cli = Cli::from_arg_matches(&matches).map_err(ConfigError::Cli)?;
        let config = RunConfiguration::from_options(&cli.options)?;
        Ok(Self {
            command: cli.command,
            config,
        })
    }
}
