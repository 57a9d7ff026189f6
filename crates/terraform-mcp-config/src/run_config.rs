//! Immutable configuration snapshot consumed by the server lifecycle.

use camino::{Utf8Path, Utf8PathBuf};

use crate::cli::GlobalOptions;
use crate::defaults::{ALL_TOOLSETS, default_log_filter, default_log_format, default_toolsets};
use crate::error::ConfigError;
use crate::logging::LogFormat;
use crate::tfe::TfeSettings;

/// Operating parameters captured once at startup.
///
/// The snapshot is resolved before the server starts and never mutated
/// afterwards. The `with_*` builders exist so embedders and tests can assemble
/// a configuration without going through the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    read_only: bool,
    log_file: Option<Utf8PathBuf>,
    log_commands: bool,
    toolsets: Vec<String>,
    log_filter: Option<String>,
    log_format: LogFormat,
    dynamic_toolsets: bool,
    export_translations: bool,
    tfe: TfeSettings,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            read_only: false,
            log_file: None,
            log_commands: false,
            toolsets: default_toolsets(),
            log_filter: None,
            log_format: default_log_format(),
            dynamic_toolsets: false,
            export_translations: false,
            tfe: TfeSettings::default(),
        }
    }
}

impl RunConfiguration {
    /// Resolves a configuration from parsed command-line options.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyToolset`] when any toolset entry is blank
    /// and [`ConfigError::EmptyLogFilter`] for a blank filter expression.
    pub fn from_options(options: &GlobalOptions) -> Result<Self, ConfigError> {
        let toolsets = normalise_toolsets(&options.toolsets)?;
        let log_filter = match options.log_filter.as_deref().map(str::trim) {
            Some("") => return Err(ConfigError::EmptyLogFilter),
            Some(filter) => Some(filter.to_owned()),
            None => None,
        };
        Ok(Self {
            read_only: options.read_only,
            log_file: options.log_file.clone(),
            log_commands: options.enable_command_logging,
            toolsets,
            log_filter,
            log_format: options.log_format.unwrap_or_else(default_log_format),
            dynamic_toolsets: options.dynamic_toolsets,
            export_translations: options.export_translations,
            tfe: TfeSettings::new(options.tfe_token.clone(), options.tfe_address.clone()),
        })
    }

    /// Sets the read-only flag.
    #[must_use]
    pub const fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Sets the command-logging flag.
    #[must_use]
    pub const fn with_command_logging(mut self, enabled: bool) -> Self {
        self.log_commands = enabled;
        self
    }

    /// Sets the log file destination.
    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Overrides the log filter expression.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    /// Sets the Terraform Enterprise credentials.
    #[must_use]
    pub fn with_tfe(mut self, tfe: TfeSettings) -> Self {
        self.tfe = tfe;
        self
    }

    /// Replaces the enabled toolsets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyToolset`] when any entry is blank.
    pub fn with_toolsets<I, S>(mut self, toolsets: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let raw: Vec<String> = toolsets.into_iter().map(Into::into).collect();
        self.toolsets = normalise_toolsets(&raw)?;
        Ok(self)
    }

    /// Whether only read-only tools may be exposed.
    #[must_use]
    pub const fn read_only(&self) -> bool {
        self.read_only
    }

    /// Log file destination; `None` means stderr.
    #[must_use]
    pub fn log_file(&self) -> Option<&Utf8Path> {
        self.log_file.as_deref()
    }

    /// Whether every transported byte is recorded in the log.
    #[must_use]
    pub const fn log_commands(&self) -> bool {
        self.log_commands
    }

    /// Enabled toolset names, normalised to lower case.
    #[must_use]
    pub fn toolsets(&self) -> &[String] {
        &self.toolsets
    }

    /// Whether the named toolset is enabled, directly or through `all`.
    #[must_use]
    pub fn toolset_enabled(&self, name: &str) -> bool {
        self.toolsets
            .iter()
            .any(|toolset| toolset == ALL_TOOLSETS || toolset.eq_ignore_ascii_case(name))
    }

    /// Effective log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter
            .as_deref()
            .unwrap_or_else(|| default_log_filter(self.log_file()))
    }

    /// Log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Whether `--dynamic-toolsets` was given.
    #[must_use]
    pub const fn dynamic_toolsets(&self) -> bool {
        self.dynamic_toolsets
    }

    /// Whether `--export-translations` was given.
    #[must_use]
    pub const fn export_translations(&self) -> bool {
        self.export_translations
    }

    /// Terraform Enterprise credentials.
    #[must_use]
    pub const fn tfe(&self) -> &TfeSettings {
        &self.tfe
    }
}

fn normalise_toolsets(raw: &[String]) -> Result<Vec<String>, ConfigError> {
    let mut toolsets: Vec<String> = Vec::with_capacity(raw.len());
    for entry in raw {
        let name = entry.trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err(ConfigError::EmptyToolset { raw: raw.to_vec() });
        }
        if !toolsets.contains(&name) {
            toolsets.push(name);
        }
    }
    if toolsets.is_empty() {
        return Ok(default_toolsets());
    }
    Ok(toolsets)
}
