//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Callback service connection settings
    #[serde(default)]
    pub service: ServiceSection,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetrySection,
}

/// Callback service section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSection {
    /// Service base URL
    pub url: Option<String>,

    /// Service secret sent as the Authorization header
    pub secret: Option<String>,

    /// Per-request network timeout in seconds
    pub timeout: Option<u64>,
}

/// Retry policy configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Maximum number of attempts, including the first
    pub max_attempts: Option<u32>,

    /// Initial retry delay in milliseconds
    pub initial_delay_ms: Option<u64>,

    /// Maximum retry delay in milliseconds
    pub max_delay_ms: Option<u64>,

    /// Backoff multiplier
    pub multiplier: Option<f64>,

    /// Random spread applied to each delay (0.0 to 1.0)
    pub jitter: Option<f64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# callback-client configuration file

[service]
# Callback service base URL (required)
# url = "https://callbacks.example.com"

# Service secret, sent as the Authorization header (required)
# secret = "your-service-secret"

# Per-request network timeout in seconds (default: 30)
# timeout = 30

[retry]
# Maximum number of attempts per request, including the first (default: 3)
# max_attempts = 3

# Delay before the first retry in milliseconds (default: 500)
# initial_delay_ms = 500

# Upper bound on any single delay in milliseconds (default: 10000)
# max_delay_ms = 10000

# Backoff multiplier (default: 2.0)
# multiplier = 2.0

# Random spread applied to each delay, 0.0 to 1.0 (default: 0.1)
# jitter = 0.1
"#
    .to_string()
}
