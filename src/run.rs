//! Application execution logic.
//!
//! This module turns a parsed subcommand into calls on the callback service
//! and prints each result as pretty JSON on stdout.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use callback_client::api::{
    BuildError, CallbackApi, CallbackClient, CallbackRequestEvent, ClientError, Payload,
};
use callback_client::config::{Command, SendArgs, ValidatedConfig, VerifyArgs};
use callback_client::signature::{self, SignatureError};
use callback_client::transport::{HttpError, ReqwestClient};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to create the HTTP client.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] HttpError),

    /// The service client could not be built from the configuration.
    #[error("Failed to create service client: {0}")]
    Build(#[from] BuildError),

    /// The `--payload` argument is not a JSON object.
    #[error("Payload must be a JSON object: {0}")]
    InvalidPayload(#[source] serde_json::Error),

    /// Failed to read the body file given to `verify`.
    #[error("Failed to read payload file '{}': {source}", path.display())]
    PayloadFile {
        /// Path to the payload file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A service call failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The received webhook did not authenticate.
    #[error("Webhook rejected: {0}")]
    Signature(#[from] SignatureError),

    /// Failed to render a result as JSON.
    #[error("Failed to render output: {0}")]
    Output(#[source] serde_json::Error),

    /// The command runs locally and has no service call.
    #[error("Command '{0}' does not call the service")]
    LocalCommand(&'static str),
}

impl RunError {
    /// Returns true if the failure is a rejected webhook signature.
    #[must_use]
    pub const fn is_signature_rejection(&self) -> bool {
        matches!(self, Self::Signature(_))
    }
}

/// Executes one service command against the configured callback service.
///
/// Ctrl+C (or SIGTERM on unix) cancels the call in flight, including any
/// pending retry delay.
///
/// # Errors
///
/// Returns an error if the client cannot be built, the input is malformed,
/// or the service call fails after retries.
///
/// # Coverage Note
///
/// Excluded from coverage because it needs a real network and signal
/// handling; the dispatch logic it wraps is tested directly.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig, command: Command) -> Result<(), RunError> {
    let client = create_client(&config)?;

    let cancel = CancellationToken::new();
    let watcher = tokio::spawn(cancel_on_shutdown(cancel.clone()));

    let result = dispatch(&client, command, &cancel).await;
    watcher.abort();

    println!("{}", result?);
    Ok(())
}

/// Creates the HTTP service client from configuration.
fn create_client(config: &ValidatedConfig) -> Result<CallbackClient<ReqwestClient>, RunError> {
    let http = ReqwestClient::with_timeout(config.timeout).map_err(RunError::HttpClient)?;

    let client = CallbackClient::new(http, config.url.clone(), &config.secret)?
        .with_retry_policy(config.retry_policy.clone());

    Ok(client)
}

/// Runs `command` on `api` and renders the result.
async fn dispatch<A: CallbackApi>(
    api: &A,
    command: Command,
    cancel: &CancellationToken,
) -> Result<String, RunError> {
    match command {
        Command::Send(args) => {
            let request = build_submission(args)?;
            let confirmation = api.submit_event(&request, cancel).await?;
            tracing::info!(
                "Event accepted, acknowledgement id {}",
                confirmation.acknowledgement_id
            );
            render(&confirmation)
        }
        Command::Event { id } => render(&api.fetch_event(id, cancel).await?),
        Command::Events { filter } => {
            let list = api.list_events(&filter, cancel).await?;
            tracing::debug!("Fetched {} event(s)", list.data.len());
            render(&list)
        }
        Command::History { id, filter } => {
            let history = api.fetch_callback_history(id, &filter, cancel).await?;
            tracing::debug!("Fetched {} delivery attempt(s)", history.data.len());
            render(&history)
        }
        Command::Init { .. } => Err(RunError::LocalCommand("init")),
        Command::Verify(_) => Err(RunError::LocalCommand("verify")),
    }
}

/// Builds a submission from `send` arguments.
fn build_submission(args: SendArgs) -> Result<CallbackRequestEvent, RunError> {
    let payload: Payload = serde_json::from_str(&args.payload).map_err(RunError::InvalidPayload)?;

    let mut request = CallbackRequestEvent::new(
        args.service_id,
        payload,
        args.callback_url,
        args.webhook_secret,
    );
    if let Some(method) = args.method {
        request = request.with_method(method.into());
    }
    if let Some(max_retries) = args.max_retries {
        request = request.with_max_retries(max_retries);
    }

    Ok(request)
}

/// Checks a received webhook body against its signature headers.
///
/// The body file is hashed exactly as stored, byte for byte.
///
/// # Errors
///
/// Returns [`RunError::PayloadFile`] if the file cannot be read and
/// [`RunError::Signature`] if the signature does not match.
pub fn verify_receipt(args: &VerifyArgs) -> Result<(), RunError> {
    let body = std::fs::read(&args.payload_file).map_err(|e| RunError::PayloadFile {
        path: args.payload_file.clone(),
        source: e,
    })?;

    signature::verify(&args.webhook_secret, &body, &args.timestamp, &args.signature)?;
    tracing::debug!("Verified {} byte(s) from {}", body.len(), args.payload_file.display());
    Ok(())
}

fn render<T: Serialize>(value: &T) -> Result<String, RunError> {
    serde_json::to_string_pretty(value).map_err(RunError::Output)
}

/// Cancels `token` when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn cancel_on_shutdown(token: CancellationToken) {
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, cancelling...");
    token.cancel();
}

/// Returns a future that completes when a shutdown signal is received.
///
/// If a handler cannot be installed the corresponding branch never fires.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
