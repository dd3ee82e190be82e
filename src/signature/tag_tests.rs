//! Tests for signing and verification.

use super::tag::constant_time_eq;
use super::{SignatureError, SignedPayload, sign, verify};
use crate::time::Clock;
use chrono::{DateTime, Utc};

const SECRET: &str = "test webhook secret key";
const TIMESTAMP: i64 = 1_700_000_000;
const PAYLOAD: &[u8] = br#"{"event":"payment_success"}"#;

struct FixedClock(i64);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap()
    }
}

mod signing {
    use super::*;

    #[test]
    fn matches_reference_vector() {
        let tag = sign(SECRET, TIMESTAMP, PAYLOAD);

        assert_eq!(
            tag,
            "7e0c11f9c87da0584d37326451d470f930899db41712dbf19e9fddfd432a4471"
        );
    }

    #[test]
    fn empty_secret_and_payload_are_accepted() {
        let tag = sign("", 0, b"");

        assert_eq!(
            tag,
            "b849d5a581847b281957065739df36df2463d1977ea8d6e1e4e6cf33fadc68c3"
        );
    }

    #[test]
    fn tag_is_lowercase_hex_of_sha256_length() {
        let tag = sign(SECRET, TIMESTAMP, PAYLOAD);

        assert_eq!(tag.len(), 64);
        assert!(
            tag.chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        );
    }

    #[test]
    fn different_secrets_produce_different_tags() {
        assert_ne!(
            sign("secret-1", TIMESTAMP, PAYLOAD),
            sign("secret-2", TIMESTAMP, PAYLOAD)
        );
    }

    #[test]
    fn signed_payload_uses_clock_time() {
        let signed = SignedPayload::new(SECRET, PAYLOAD, &FixedClock(TIMESTAMP));

        assert_eq!(signed.timestamp, TIMESTAMP);
        assert_eq!(signed.timestamp_header(), "1700000000");
        assert_eq!(signed.signature, sign(SECRET, TIMESTAMP, PAYLOAD));
    }
}

mod verification {
    use super::*;

    #[test]
    fn sign_then_verify_returns_original_payload() {
        let tag = sign(SECRET, TIMESTAMP, PAYLOAD);

        let verified = verify(SECRET, PAYLOAD, "1700000000", &tag).unwrap();

        assert_eq!(verified, PAYLOAD);
    }

    #[test]
    fn round_trip_holds_for_binary_payloads() {
        let payload: Vec<u8> = (0..=255).collect();
        let tag = sign(SECRET, 42, &payload);

        assert_eq!(verify(SECRET, &payload, "42", &tag).unwrap(), &payload[..]);
    }

    #[test]
    fn flipping_any_payload_byte_fails() {
        let tag = sign(SECRET, TIMESTAMP, PAYLOAD);

        for i in 0..PAYLOAD.len() {
            let mut tampered = PAYLOAD.to_vec();
            tampered[i] ^= 0x01;

            assert_eq!(
                verify(SECRET, &tampered, "1700000000", &tag),
                Err(SignatureError::Mismatch),
                "byte {i} flip was not detected"
            );
        }
    }

    #[test]
    fn flipping_any_timestamp_byte_fails() {
        let tag = sign(SECRET, TIMESTAMP, PAYLOAD);
        let timestamp = TIMESTAMP.to_string();

        for i in 0..timestamp.len() {
            let mut tampered = timestamp.clone().into_bytes();
            tampered[i] ^= 0x01;
            let tampered = String::from_utf8(tampered).unwrap();

            assert!(
                verify(SECRET, PAYLOAD, &tampered, &tag).is_err(),
                "timestamp byte {i} flip was not detected"
            );
        }
    }

    #[test]
    fn wrong_secret_fails() {
        let tag = sign("secret-1", TIMESTAMP, PAYLOAD);

        assert!(verify("secret-2", PAYLOAD, "1700000000", &tag).is_err());
    }

    #[test]
    fn uppercase_tag_is_rejected() {
        let tag = sign(SECRET, TIMESTAMP, PAYLOAD).to_uppercase();

        assert!(verify(SECRET, PAYLOAD, "1700000000", &tag).is_err());
    }

    #[test]
    fn truncated_tag_is_rejected() {
        let tag = sign(SECRET, TIMESTAMP, PAYLOAD);

        assert!(verify(SECRET, PAYLOAD, "1700000000", &tag[..63]).is_err());
        assert!(verify(SECRET, PAYLOAD, "1700000000", "").is_err());
    }

    #[test]
    fn timestamp_is_not_normalized() {
        // A leading zero changes the signed bytes even though the number is equal
        let tag = sign(SECRET, TIMESTAMP, PAYLOAD);

        assert!(verify(SECRET, PAYLOAD, "01700000000", &tag).is_err());
    }
}

mod comparison {
    use super::*;

    #[test]
    fn equal_slices_compare_equal() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn differing_slices_compare_unequal() {
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
