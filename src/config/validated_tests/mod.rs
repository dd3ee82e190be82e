//! Tests for validated configuration.

use super::ConfigError;
use super::cli::Cli;
use super::toml::TomlConfig;
use super::validated::ValidatedConfig;

/// Helper to create CLI args from a slice.
///
/// Appends the `events` subcommand so only global options need to be given.
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["callback-client"];
    full_args.extend(args);
    full_args.push("events");
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}
