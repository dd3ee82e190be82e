//! Error types for the transport layer.

use std::fmt;

use thiserror::Error;

/// Error from a single HTTP exchange.
///
/// Describes what went wrong on the wire without dictating recovery.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// Includes DNS resolution failures, refused connections and
    /// other network-level errors.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server did not respond within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request URL could not be used.
    ///
    /// A configuration error; sending the same request again cannot succeed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The response arrived but its body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Low-level failure of an attempt that never produced a decoded result.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP exchange itself failed.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The request body could not be serialized.
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// The response body did not match the expected shape.
    #[error("Failed to decode response body (status {status}): {source}")]
    Decode {
        /// Status of the response whose body failed to decode
        status: http::StatusCode,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome of a failed [`Executor`](super::Executor) attempt.
///
/// Keeps a decoded structured error apart from a raw transport failure so
/// callers can branch on the variant instead of inspecting messages.
#[derive(Debug)]
pub enum ExecuteError<E> {
    /// The server answered outside 2xx and the body decoded as `E`.
    RequestFailed {
        /// Response status
        status: http::StatusCode,
        /// Decoded error body
        error: E,
    },

    /// The attempt failed before a structured error could be decoded.
    Transport(TransportError),
}

impl<E> From<TransportError> for ExecuteError<E> {
    fn from(error: TransportError) -> Self {
        Self::Transport(error)
    }
}

impl<E> From<HttpError> for ExecuteError<E> {
    fn from(error: HttpError) -> Self {
        Self::Transport(error.into())
    }
}

impl<E: fmt::Display> fmt::Display for ExecuteError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { status, error } => {
                write!(f, "Request failed with status {status}: {error}")
            }
            Self::Transport(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for ExecuteError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RequestFailed { .. } => None,
            Self::Transport(e) => Some(e),
        }
    }
}
