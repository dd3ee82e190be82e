//! Process-level glue for the binary: exit codes, log setup and hints.

use callback_client::config::{ConfigError, field};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::run::RunError;

/// Exit codes reported to the shell.
pub mod exit_code {
    use std::process::ExitCode;

    /// 0: the command completed.
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// 1: bad arguments, unreadable config or a missing required value.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// 2: the service call or local I/O failed.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }

    /// 3: a received webhook failed signature verification.
    pub fn signature_rejected() -> ExitCode {
        ExitCode::from(3)
    }
}

/// Maps a command failure to its exit code.
pub fn exit_code_for(error: &RunError) -> std::process::ExitCode {
    if error.is_signature_rejection() {
        exit_code::signature_rejected()
    } else {
        exit_code::runtime_error()
    }
}

/// Returns a follow-up hint for configuration errors a template would fix.
pub fn config_hint(error: &ConfigError) -> Option<&'static str> {
    const INIT_HINT: &str = "Run 'callback-client init' to generate a configuration template.";

    match error {
        ConfigError::MissingRequired { field: f, .. } if [field::URL, field::SECRET].contains(f) => {
            Some(INIT_HINT)
        }
        ConfigError::FileRead { .. } => Some(INIT_HINT),
        _ => None,
    }
}

/// Installs the global tracing subscriber.
///
/// INFO by default, DEBUG with `--verbose`; `RUST_LOG` overrides both.
/// Logs go to stderr so command output on stdout stays machine-readable.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
