//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

/// Default output path for `init`.
pub const CONFIG_FILE: &str = "callback-client.toml";

/// Default per-request network timeout in seconds.
pub const TIMEOUT_SECS: u64 = 30;

/// Default maximum number of attempts, including the first.
pub const RETRY_MAX_ATTEMPTS: u32 = 3;

/// Default initial retry delay in milliseconds.
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;

/// Default maximum retry delay in milliseconds.
pub const RETRY_MAX_DELAY_MS: u64 = 10_000;

/// Default retry backoff multiplier.
pub const RETRY_MULTIPLIER: f64 = 2.0;

/// Default retry jitter fraction.
pub const RETRY_JITTER: f64 = 0.1;
