//! Build metadata reported by `--version`, the startup event and the server
//! handshake.
//!
//! The commit and build date are stamped by the release pipeline through the
//! `TERRAFORM_MCP_COMMIT` and `TERRAFORM_MCP_BUILD_DATE` environment variables
//! at compile time. Local builds report `unknown` for both.

use serde::Serialize;
use serde_json::{Map, Value};

const UNKNOWN: &str = "unknown";

/// Name the server announces to MCP clients.
pub const SERVER_NAME: &str = "terraform-mcp-server";

const COMMIT: &str = match option_env!("TERRAFORM_MCP_COMMIT") {
    Some(commit) => commit,
    None => UNKNOWN,
};

const BUILD_DATE: &str = match option_env!("TERRAFORM_MCP_BUILD_DATE") {
    Some(date) => date,
    None => UNKNOWN,
};

/// Version, commit and build date of the running binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    /// Crate version.
    pub version: &'static str,
    /// Source commit the binary was built from.
    pub commit: &'static str,
    /// Build timestamp.
    pub date: &'static str,
}

impl BuildInfo {
    /// Metadata for the current binary.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: COMMIT,
            date: BUILD_DATE,
        }
    }

    /// Text printed for `--version`.
    #[must_use]
    pub fn long_version(&self) -> String {
        format!(
            "Version: {}\nCommit: {}\nBuild Date: {}",
            self.version, self.commit, self.date
        )
    }

    /// Attribute map attached to the server-started telemetry event.
    #[must_use]
    pub fn attributes(&self) -> Map<String, Value> {
        let mut attributes = Map::new();
        attributes.insert("version".to_owned(), Value::from(self.version));
        attributes.insert("commit".to_owned(), Value::from(self.commit));
        attributes.insert("date".to_owned(), Value::from(self.date));
        attributes
    }
}
