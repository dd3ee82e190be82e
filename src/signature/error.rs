//! Error types for signature verification.

use thiserror::Error;

/// Error returned when an inbound callback cannot be authenticated.
///
/// None of these are retryable; the receiver must reject the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The supplied tag does not match the recomputed one.
    #[error("signature verification failed")]
    Mismatch,

    /// A required header was absent from the request.
    #[error("missing header: {0}")]
    MissingHeader(&'static str),

    /// A header was present but not valid visible ASCII.
    #[error("invalid header value: {0}")]
    InvalidHeader(&'static str),
}
