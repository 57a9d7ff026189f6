//! Entry point for the Terraform MCP server binary.
//!
//! Resolves configuration, installs logging and hands control to the stdio
//! supervisor. Diagnostics go to stderr; stdout belongs to the protocol.

use std::io::{self, Write};
use std::process::ExitCode;

use terraform_mcp_config::{Command, ConfigError, Invocation};
use terraform_mcp_server::{BuildInfo, ToolRegistry, initialise_logging, run_stdio_server};

fn main() -> ExitCode {
    let long_version = BuildInfo::current().long_version();
    let invocation = match Invocation::load_with_long_version(long_version) {
        Ok(invocation) => invocation,
        Err(ConfigError::Cli(error)) => error.exit(),
        Err(error) => return report(&error),
    };
    if let Err(error) = initialise_logging(&invocation.config) {
        return report(&error);
    }
    match invocation.command {
        Command::Stdio => match run_stdio_server(invocation.config, ToolRegistry::new()) {
            Ok(_) => ExitCode::SUCCESS,
            Err(error) => report(&error),
        },
    }
}

fn report(error: &dyn std::error::Error) -> ExitCode {
    let mut message = format!("Error: {error}");
    let mut source = error.source();
    while let Some(cause) = source {
        let rendered = cause.to_string();
        if !message.contains(&rendered) {
            message.push_str(": ");
            message.push_str(&rendered);
        }
        source = cause.source();
    }
    match writeln!(io::stderr().lock(), "{message}") {
        Ok(()) | Err(_) => ExitCode::FAILURE,
    }
}
