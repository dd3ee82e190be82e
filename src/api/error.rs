//! Error types for the domain operations.

use thiserror::Error;

use super::ServiceError;
use super::envelope::ErrorEnvelope;
use crate::transport::{Cancelled, ExecuteError, HttpError, IsRetryable, TransportError};

/// A submission rejected before any request was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No service id was given.
    #[error("service_id is required")]
    MissingServiceId,

    /// The payload object has no keys.
    #[error("payload must not be empty")]
    EmptyPayload,

    /// The callback URL is blank.
    #[error("callback url is required")]
    MissingCallbackUrl,

    /// The callback URL does not parse as an absolute http(s) URL.
    #[error("invalid callback url '{url}': {reason}")]
    InvalidCallbackUrl { url: String, reason: String },

    /// No webhook secret was given.
    #[error("webhook secret is required")]
    MissingWebhookSecret,

    /// The method is not one of POST, GET, PUT, PATCH or DELETE.
    #[error("unsupported callback method '{0}'")]
    InvalidMethod(String),
}

impl ValidationError {
    /// Returns the JSON name of the offending field.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::MissingServiceId => "service_id",
            Self::EmptyPayload => "payload",
            Self::MissingCallbackUrl | Self::InvalidCallbackUrl { .. } => "callback_url",
            Self::MissingWebhookSecret => "webhook_secret",
            Self::InvalidMethod(_) => "method",
        }
    }
}

/// Error returned by every [`CallbackApi`](super::CallbackApi) operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request failed local checks; nothing was sent.
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    /// The service answered with a structured error.
    #[error("Service rejected request with status {status}: {error}")]
    Service {
        status: http::StatusCode,
        error: ServiceError,
    },

    /// The request never produced a structured answer.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The caller's cancellation token fired.
    #[error("Operation cancelled")]
    Cancelled,
}

impl ClientError {
    /// Returns the structured error body, if the service sent one.
    #[must_use]
    pub const fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns the HTTP status of the failing response, if there was one.
    #[must_use]
    pub const fn status(&self) -> Option<http::StatusCode> {
        match self {
            Self::Service { status, .. } | Self::Transport(TransportError::Decode { status, .. }) => {
                Some(*status)
            }
            _ => None,
        }
    }
}

impl From<Cancelled> for ClientError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}

impl From<ExecuteError<ErrorEnvelope>> for ClientError {
    fn from(error: ExecuteError<ErrorEnvelope>) -> Self {
        match error {
            ExecuteError::RequestFailed { status, error } => Self::Service {
                status,
                error: error.error,
            },
            ExecuteError::Transport(e) => Self::Transport(e),
        }
    }
}

impl IsRetryable for ClientError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Service { .. } => true,
            Self::Transport(e) => match e {
                TransportError::Http(HttpError::InvalidUrl(_)) | TransportError::Encode(_) => false,
                TransportError::Http(_) | TransportError::Decode { .. } => true,
            },
            Self::Validation(_) | Self::Cancelled => false,
        }
    }
}

/// A [`CallbackClient`](super::CallbackClient) could not be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// The base URL is not http(s) or cannot take path segments.
    #[error("invalid service url: {0}")]
    InvalidBaseUrl(String),

    /// The secret contains bytes that are not allowed in a header value.
    #[error("service secret is not a valid header value")]
    InvalidSecret,
}
