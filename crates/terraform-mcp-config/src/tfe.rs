//! Terraform Enterprise credentials resolved from the environment.

use std::fmt;

/// Address used when a token is configured without an explicit address.
pub const DEFAULT_TFE_ADDRESS: &str = "https://app.terraform.io";

/// How the enterprise client will be set up for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TfeAccess<'a> {
    /// No token was supplied; enterprise tools run without credentials.
    Anonymous,
    /// A token was supplied without an address, so the default is used.
    DefaultAddress(&'a str),
    /// Both the token and the address were supplied.
    Configured(&'a str),
}

/// Token and address for the Terraform Enterprise API.
///
/// `Debug` redacts the token.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TfeSettings {
    token: Option<String>,
    address: Option<String>,
}

impl fmt::Debug for TfeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TfeSettings")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("address", &self.address)
            .finish()
    }
}

impl TfeSettings {
    /// Builds settings; blank values count as unset.
    #[must_use]
    pub fn new(token: Option<String>, address: Option<String>) -> Self {
        Self {
            token: non_blank(token),
            address: non_blank(address),
        }
    }

    /// API token, when one was supplied.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Effective API address.
    #[must_use]
    pub fn address(&self) -> &str {
        self.address.as_deref().unwrap_or(DEFAULT_TFE_ADDRESS)
    }

    /// Classifies the settings for startup reporting.
    #[must_use]
    pub fn access(&self) -> TfeAccess<'_> {
        match (&self.token, &self.address) {
            (None, _) => TfeAccess::Anonymous,
            (Some(_), None) => TfeAccess::DefaultAddress(DEFAULT_TFE_ADDRESS),
            (Some(_), Some(address)) => TfeAccess::Configured(address),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}
