//! Structured logging initialisation for the server.
//!
//! Logs never go to stdout, which carries the protocol. They are written to
//! stderr, or appended to the configured log file.

use std::fs::{File, OpenOptions};
use std::io::{self, IsTerminal};
use std::sync::Mutex;

use camino::{Utf8Path, Utf8PathBuf};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::{self, writer::BoxMakeWriter};

use terraform_mcp_config::{LogFormat, RunConfiguration};

use crate::transport::COMMANDS_TARGET;

static LOGGING_GUARD: OnceCell<()> = OnceCell::new();

/// Handle returned when logging has been initialised.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandle;

/// Errors encountered while configuring logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log file could not be opened for appending.
    #[error("failed to open log file '{path}': {source}")]
    OpenLogFile {
        /// Configured log file path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install logging subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Configures the global tracing subscriber when invoked for the first time.
///
/// Repeated calls are idempotent: only the first installs the subscriber.
///
/// # Errors
///
/// Returns a [`LoggingError`] when the log file cannot be opened, the filter
/// does not parse, or another subscriber is already installed.
pub fn initialise(config: &RunConfiguration) -> Result<LoggingHandle, LoggingError> {
    LOGGING_GUARD
        .get_or_try_init(|| install_subscriber(config))
        .map(|_| LoggingHandle)
}

/// Opens `path` for appending, creating it when missing.
pub(crate) fn open_log_file(path: &Utf8Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenLogFile {
            path: path.to_owned(),
            source,
        })
}

/// Parses the configured filter. Command logging keeps its target at `info`
/// whatever the rest of the filter says.
fn build_filter(config: &RunConfiguration) -> Result<EnvFilter, LoggingError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| LoggingError::Filter(error.to_string()))?;
    if !config.log_commands() {
        return Ok(filter);
    }
    let directive = format!("{COMMANDS_TARGET}=info")
        .parse::<Directive>()
        .map_err(|error| LoggingError::Filter(error.to_string()))?;
    Ok(filter.add_directive(directive))
}

fn install_subscriber(config: &RunConfiguration) -> Result<(), LoggingError> {
    let filter = build_filter(config)?;
    let log_file = config.log_file().map(open_log_file).transpose()?;
    // Colour only makes sense on an interactive stderr.
    let ansi = log_file.is_none() && io::stderr().is_terminal();
    let writer = log_file.map_or_else(
        || BoxMakeWriter::new(io::stderr),
        |file| BoxMakeWriter::new(Mutex::new(file)),
    );

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    };

    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::Subscriber)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::tests::support::SharedBuffer;
    use crate::transport::{Direction, Recorder, TracingRecorder};

    fn record_under(config: &RunConfiguration) -> String {
        let filter = build_filter(config).expect("valid filter");
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            TracingRecorder
                .record(Direction::Inbound, b"{\"method\":\"ping\"}\n")
                .expect("record inbound");
            TracingRecorder
                .record(Direction::Outbound, b"{\"result\":{}}\n")
                .expect("record outbound");
        });
        String::from_utf8_lossy(&buffer.contents()).into_owned()
    }

    fn utf8(dir: &TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("temp path is utf-8")
    }

    #[rstest]
    fn log_file_is_created_and_appended() {
        let dir = TempDir::new().expect("temp dir");
        let path = utf8(&dir, "server.log");
        std::fs::write(&path, "existing\n").expect("seed log file");

        let mut file = open_log_file(&path).expect("open log file");
        writeln!(file, "appended").expect("write log line");

        let contents = std::fs::read_to_string(&path).expect("read log file");
        assert_eq!(contents, "existing\nappended\n");
    }

    #[rstest]
    fn missing_directory_is_reported_with_its_path() {
        let dir = TempDir::new().expect("temp dir");
        let path = utf8(&dir, "missing/server.log");

        let error = open_log_file(&path).expect_err("missing parent directory");
        assert!(matches!(error, LoggingError::OpenLogFile { .. }));
        assert!(error.to_string().contains("missing/server.log"));
    }

    #[rstest]
    fn invalid_filters_are_rejected_before_installing() {
        let config = RunConfiguration::default().with_log_filter("terraform_mcp_server=loud");
        let error = install_subscriber(&config).expect_err("filter must not parse");
        assert!(matches!(error, LoggingError::Filter(_)));
    }

    #[rstest]
    fn command_logging_survives_a_restrictive_filter() {
        let config = RunConfiguration::default()
            .with_command_logging(true)
            .with_log_filter("warn");
        let log = record_under(&config);
        assert!(log.contains("ping"), "inbound chunk missing: {log}");
        assert!(log.contains("result"), "outbound chunk missing: {log}");
    }

    #[rstest]
    fn restrictive_filter_applies_without_command_logging() {
        let config = RunConfiguration::default().with_log_filter("warn");
        assert!(record_under(&config).is_empty());
    }
}
