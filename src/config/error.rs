//! Configuration errors.

use std::path::PathBuf;

use thiserror::Error;

/// Why the command line and config file could not be turned into a
/// [`ValidatedConfig`](super::ValidatedConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file named by `--config` could not be opened or read.
    #[error("Cannot read config file '{}': {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has unknown keys.
    #[error("Malformed config file: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// `init` could not write the template.
    #[error("Cannot write config template '{}': {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Neither the command line nor the config file set a required value.
    #[error("No {field} configured. {hint}")]
    MissingRequired {
        /// One of the [`field`] constants
        field: &'static str,
        hint: &'static str,
    },

    /// The service base URL is unusable.
    #[error("Service URL '{url}' rejected: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The service secret cannot be sent as an `Authorization` header.
    #[error("Service secret must be visible ASCII without line breaks")]
    InvalidSecret,

    /// A duration setting is out of range.
    #[error("{field} out of range: {reason}")]
    InvalidDuration { field: &'static str, reason: String },

    /// The retry settings do not form a usable policy.
    #[error("Retry settings rejected: {0}")]
    InvalidRetry(String),
}

impl ConfigError {
    pub(super) const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }
}

/// Names reported in [`ConfigError::MissingRequired`].
pub mod field {
    /// `--url` / `service.url`
    pub const URL: &str = "url";
    /// `--secret` / `service.secret`
    pub const SECRET: &str = "secret";
}
