//! HMAC-SHA256 message authentication for callback payloads.
//!
//! The same tag routine backs both directions:
//! - [`sign`] when a callback is delivered
//! - [`verify`] when a callback is received
//!
//! The tag is `hex(HMAC-SHA256(secret, "<unix-seconds>.<payload>"))`.

mod error;
mod tag;

#[cfg(test)]
mod tag_tests;

pub use error::SignatureError;
pub use tag::{SignedPayload, sign, verify};
