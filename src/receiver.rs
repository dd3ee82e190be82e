//! Authentication of inbound callback deliveries.
//!
//! A delivery carries its signature and the signing time as headers:
//!
//! ```text
//! X-MP-SIGNATURE: <hex HMAC-SHA256>
//! X-MP-Time: <unix seconds>
//! ```
//!
//! [`verify_request`] extracts both and checks them against the raw body.

use http::HeaderMap;

use crate::signature::{self, SignatureError};

/// Header carrying the hex-encoded signature tag.
pub const SIGNATURE_HEADER: &str = "X-MP-SIGNATURE";

/// Header carrying the Unix timestamp the tag was computed over.
pub const TIMESTAMP_HEADER: &str = "X-MP-Time";

/// Verifies a received callback and returns its body unchanged.
///
/// The timestamp header is used exactly as received; no freshness window is
/// applied.
///
/// # Errors
///
/// - [`SignatureError::MissingHeader`] if either header is absent
/// - [`SignatureError::InvalidHeader`] if a header is not visible ASCII
/// - [`SignatureError::Mismatch`] if the tag does not authenticate the body
///
/// # Example
///
/// ```
/// use callback_client::receiver::{SIGNATURE_HEADER, TIMESTAMP_HEADER, verify_request};
/// use callback_client::signature::sign;
/// use http::{HeaderMap, HeaderValue};
///
/// let body = br#"{"event":"payment_success"}"#;
/// let mut headers = HeaderMap::new();
/// headers.insert(SIGNATURE_HEADER, sign("whsec", 1_700_000_000, body).parse().unwrap());
/// headers.insert(TIMESTAMP_HEADER, HeaderValue::from_static("1700000000"));
///
/// assert_eq!(verify_request("whsec", &headers, body), Ok(&body[..]));
/// ```
pub fn verify_request<'a>(
    secret: &str,
    headers: &HeaderMap,
    body: &'a [u8],
) -> Result<&'a [u8], SignatureError> {
    let tag = header(headers, SIGNATURE_HEADER)?;
    let timestamp = header(headers, TIMESTAMP_HEADER)?;

    signature::verify(secret, body, timestamp, tag).inspect_err(|_| {
        tracing::debug!(timestamp, "Rejected callback with invalid signature");
    })
}

fn header<'h>(headers: &'h HeaderMap, name: &'static str) -> Result<&'h str, SignatureError> {
    headers
        .get(name)
        .ok_or(SignatureError::MissingHeader(name))?
        .to_str()
        .map_err(|_| SignatureError::InvalidHeader(name))
}
