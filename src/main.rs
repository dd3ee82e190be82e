//! callback-client: command-line client for a callback delivery service
//!
//! Entry point for the callback-client application.

use callback_client::config::{Cli, Command, ValidatedConfig, VerifyArgs, write_default_config};
use std::process::ExitCode;

mod app;
mod run;

use app::{config_hint, exit_code, exit_code_for, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Local subcommands need no service configuration
    match &cli.command {
        Command::Init { output } => return handle_init(output),
        Command::Verify(args) => {
            setup_tracing(cli.verbose);
            return handle_verify(args);
        }
        _ => {}
    }

    // Load and validate configuration
    let config = match ValidatedConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if let Some(hint) = config_hint(&e) {
                eprintln!("\n{hint}");
            }
            return exit_code::CONFIG_ERROR;
        }
    };

    // Setup logging and run
    setup_tracing(config.verbose);
    tracing::debug!("{config}");

    run_application(config, cli.command)
}

/// Handles the `init` subcommand.
fn handle_init(output: &std::path::Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Handles the `verify` subcommand.
fn handle_verify(args: &VerifyArgs) -> ExitCode {
    match run::verify_receipt(args) {
        Ok(()) => {
            println!("Signature valid");
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            exit_code_for(&e)
        }
    }
}

/// Runs one service command with the given configuration.
///
/// Excluded from coverage - requires async runtime.
#[cfg(not(tarpaulin_include))]
fn run_application(config: ValidatedConfig, command: Command) -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    match runtime.block_on(run::execute(config, command)) {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            exit_code_for(&e)
        }
    }
}
