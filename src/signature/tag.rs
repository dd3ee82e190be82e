//! Tag computation shared by the signer and the verifier.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::SignatureError;
use crate::time::Clock;

type HmacSha256 = Hmac<Sha256>;

/// Computes the hex-encoded signature tag for a payload.
///
/// The signed message is the decimal `timestamp`, a single `.`, then the
/// payload bytes exactly as given. The result is lower-case hex.
///
/// # Example
///
/// ```
/// use callback_client::signature::{sign, verify};
///
/// let tag = sign("secret", 1_700_000_000, b"{}");
/// assert!(verify("secret", b"{}", "1700000000", &tag).is_ok());
/// ```
#[must_use]
pub fn sign(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    compute_tag(secret, timestamp.to_string().as_bytes(), payload)
}

/// Authenticates a received payload against its supplied tag.
///
/// `timestamp` is the raw header value and is hashed byte-for-byte, never
/// re-parsed. The comparison runs over the full tag regardless of where the
/// first difference is.
///
/// # Errors
///
/// Returns [`SignatureError::Mismatch`] if the recomputed tag differs from
/// `supplied_tag` in any way, including case or length.
pub fn verify<'a>(
    secret: &str,
    payload: &'a [u8],
    timestamp: &str,
    supplied_tag: &str,
) -> Result<&'a [u8], SignatureError> {
    let expected = compute_tag(secret, timestamp.as_bytes(), payload);

    if constant_time_eq(expected.as_bytes(), supplied_tag.as_bytes()) {
        Ok(payload)
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// A tag together with the timestamp it was computed for.
///
/// Produced when delivering a callback; both values travel as headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    /// Unix seconds used in the signed message.
    pub timestamp: i64,
    /// Hex-encoded HMAC-SHA256 tag.
    pub signature: String,
}

impl SignedPayload {
    /// Signs `payload` at the clock's current time.
    #[must_use]
    pub fn new(secret: &str, payload: &[u8], clock: &impl Clock) -> Self {
        let timestamp = clock.now().timestamp();
        Self {
            timestamp,
            signature: sign(secret, timestamp, payload),
        }
    }

    /// Returns the timestamp formatted for the timestamp header.
    #[must_use]
    pub fn timestamp_header(&self) -> String {
        self.timestamp.to_string()
    }
}

fn compute_tag(secret: &str, timestamp: &[u8], payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(timestamp);
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

pub(super) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
