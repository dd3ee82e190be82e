//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use super::defaults;
use crate::api::Method;

/// callback-client: talk to a callback delivery service
///
/// Submits events for webhook delivery, inspects their state and delivery
/// history, and verifies signed webhook receipts.
#[derive(Debug, Parser)]
#[command(name = "callback-client")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Callback service base URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Service secret sent as the Authorization header
    #[arg(long, global = true)]
    pub secret: Option<String>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Maximum number of attempts per request
    #[arg(long = "retry-max", global = true)]
    pub retry_max: Option<u32>,

    /// Initial retry delay in milliseconds
    #[arg(long = "retry-delay-ms", global = true)]
    pub retry_delay_ms: Option<u64>,

    /// Per-request network timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for callback-client
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = defaults::CONFIG_FILE)]
        output: PathBuf,
    },

    /// Submit an event for delivery
    Send(SendArgs),

    /// Show one event
    Event {
        /// Event id
        id: Uuid,
    },

    /// List events
    Events {
        /// Pre-encoded query string, e.g. "status=FAILED&page=2"
        #[arg(long, default_value = "")]
        filter: String,
    },

    /// Show the delivery attempts of one event
    History {
        /// Event id
        id: Uuid,

        /// Pre-encoded query string
        #[arg(long, default_value = "")]
        filter: String,
    },

    /// Verify a received webhook against its signature headers
    Verify(VerifyArgs),
}

/// Arguments for `send`.
#[derive(Debug, Args)]
pub struct SendArgs {
    /// Id of the submitting service
    #[arg(long = "service-id")]
    pub service_id: Uuid,

    /// Event payload as a JSON object
    #[arg(long)]
    pub payload: String,

    /// URL the service delivers the payload to
    #[arg(long = "callback-url")]
    pub callback_url: String,

    /// Secret used to sign deliveries
    #[arg(long = "webhook-secret")]
    pub webhook_secret: String,

    /// HTTP method used for delivery
    #[arg(long, value_enum)]
    pub method: Option<MethodArg>,

    /// How many times the service may retry delivery
    #[arg(long = "max-retries")]
    pub max_retries: Option<i64>,
}

/// Arguments for `verify`.
#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Secret the delivery was signed with
    #[arg(long = "webhook-secret")]
    pub webhook_secret: String,

    /// Value of the X-MP-Time header
    #[arg(long)]
    pub timestamp: String,

    /// Value of the X-MP-SIGNATURE header
    #[arg(long)]
    pub signature: String,

    /// File holding the raw request body
    #[arg(long = "payload-file")]
    pub payload_file: PathBuf,
}

/// Delivery method argument for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    #[value(name = "POST")]
    Post,
    #[value(name = "GET")]
    Get,
    #[value(name = "PUT")]
    Put,
    #[value(name = "PATCH")]
    Patch,
    #[value(name = "DELETE")]
    Delete,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Post => Self::Post,
            MethodArg::Get => Self::Get,
            MethodArg::Put => Self::Put,
            MethodArg::Patch => Self::Patch,
            MethodArg::Delete => Self::Delete,
        }
    }
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Parses CLI arguments from an iterator, returning clap's error instead
    /// of exiting.
    ///
    /// # Errors
    ///
    /// Returns the clap error for unknown flags, missing values or a missing
    /// subcommand.
    pub fn try_parse_from_iter<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(iter)
    }
}
