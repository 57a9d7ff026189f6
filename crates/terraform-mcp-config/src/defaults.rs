use camino::Utf8Path;

use crate::logging::LogFormat;

/// Toolset name that enables every registered toolset.
pub const ALL_TOOLSETS: &str = "all";

/// Default log filter expression when logging to stderr.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression when logging to a file.
///
/// File logs are primarily used for auditing sessions, so they default to the
/// more verbose level.
pub const FILE_LOG_FILTER: &str = "debug";

/// Toolsets enabled when none are configured.
#[must_use]
pub fn default_toolsets() -> Vec<String> {
    vec![ALL_TOOLSETS.to_owned()]
}

/// Default log filter for the given log destination.
#[must_use]
pub const fn default_log_filter(log_file: Option<&Utf8Path>) -> &'static str {
    match log_file {
        Some(_) => FILE_LOG_FILTER,
        None => DEFAULT_LOG_FILTER,
    }
}

/// Default logging format for the server.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}
