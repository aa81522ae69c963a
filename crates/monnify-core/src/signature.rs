//! Webhook signature computation and verification.
//!
//! Monnify signs every webhook delivery with HMAC-SHA512 over the raw request
//! body, keyed with the merchant's client secret, and sends the lowercase hex
//! digest in the `monnify-signature` header.
//!
//! The payload must be the body exactly as received. Hashing a re-serialized
//! JSON value (re-ordered keys, different whitespace) produces a different
//! digest and fails verification.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha512};

use crate::error::{MonnifyError, Result};

type HmacSha512 = Hmac<Sha512>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "monnify-signature";

/// Computes a keyed signature over a payload.
///
/// Implementations must be pure: identical `(secret, payload)` pairs always
/// produce identical output.
pub trait Signer: Send + Sync {
    /// Sign `payload` with `secret`, returning lowercase hex.
    fn sign(&self, secret: &[u8], payload: &[u8]) -> String;
}

impl<S: Signer + ?Sized> Signer for Arc<S> {
    fn sign(&self, secret: &[u8], payload: &[u8]) -> String {
        (**self).sign(secret, payload)
    }
}

/// HMAC-SHA512 signer used by Monnify.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha512Signer;

impl Signer for HmacSha512Signer {
    /// # Panics
    ///
    /// Never panics in practice; HMAC accepts keys of any size.
    fn sign(&self, secret: &[u8], payload: &[u8]) -> String {
        // INVARIANT: HMAC accepts keys of any size per RFC 2104, so
        // `new_from_slice` only fails if the Hmac implementation is broken.
        let mut mac = HmacSha512::new_from_slice(secret).expect("HMAC-SHA512 accepts any key size");
        mac.update(payload);

        hex::encode(mac.finalize().into_bytes())
    }
}

/// Compute the HMAC-SHA512 signature of `payload` and return it hex-encoded.
///
/// An empty payload is legal and yields a deterministic digest. An empty
/// secret is not rejected here; configuration validation is the caller's job.
#[must_use]
pub fn sign(secret: &[u8], payload: &[u8]) -> String {
    HmacSha512Signer.sign(secret, payload)
}

/// Verify a received signature against `payload` using HMAC-SHA512.
#[must_use]
pub fn verify(payload: &[u8], secret: &[u8], received_signature: &str) -> bool {
    SignatureVerifier::<HmacSha512Signer>::default().verify(payload, secret, received_signature)
}

/// Constant-time byte comparison.
///
/// Every byte is inspected when the lengths agree, so the running time does
/// not reveal the position of the first difference.
#[must_use]
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b) {
        result |= x ^ y;
    }
    result == 0
}

/// Compares received signatures with freshly computed ones.
#[derive(Debug, Clone, Default)]
pub struct SignatureVerifier<S = HmacSha512Signer> {
    signer: S,
}

impl<S: Signer> SignatureVerifier<S> {
    /// Create a verifier backed by the given signer.
    pub const fn new(signer: S) -> Self {
        Self { signer }
    }

    /// Recompute the signature of `payload` and compare it to `received_signature`.
    ///
    /// A mismatch is a normal outcome, not an error. The comparison is exact
    /// (case-sensitive, full length) and runs in constant time.
    pub fn verify(&self, payload: &[u8], secret: &[u8], received_signature: &str) -> bool {
        let expected = self.signer.sign(secret, payload);
        constant_time_eq(expected.as_bytes(), received_signature.as_bytes())
    }

    /// Fail-closed variant of [`Self::verify`].
    ///
    /// # Errors
    ///
    /// Returns [`MonnifyError::SignatureMismatch`] when the signatures differ.
    pub fn verify_strict(&self, payload: &[u8], secret: &[u8], received_signature: &str) -> Result<()> {
        if self.verify(payload, secret, received_signature) {
            Ok(())
        } else {
            Err(MonnifyError::SignatureMismatch)
        }
    }
}

/// Compute the legacy `transactionHash` carried inside legacy callbacks.
///
/// The hash is plain SHA-512 (not HMAC) over
/// `{secret}|{payment_reference}|{amount_paid}|{paid_on}|{transaction_reference}`.
/// `amount_paid` must be the amount string exactly as it appears in the
/// notification (for example `"150000.00"`).
#[must_use]
pub fn transaction_hash(
    secret: &str,
    payment_reference: &str,
    amount_paid: &str,
    paid_on: &str,
    transaction_reference: &str,
) -> String {
    let input =
        format!("{secret}|{payment_reference}|{amount_paid}|{paid_on}|{transaction_reference}");
    hex::encode(Sha512::digest(input.as_bytes()))
}

/// Check a legacy `transactionHash` value in constant time.
#[must_use]
pub fn verify_transaction_hash(
    secret: &str,
    payment_reference: &str,
    amount_paid: &str,
    paid_on: &str,
    transaction_reference: &str,
    received_hash: &str,
) -> bool {
    let expected = transaction_hash(
        secret,
        payment_reference,
        amount_paid,
        paid_on,
        transaction_reference,
    );
    constant_time_eq(expected.as_bytes(), received_hash.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE_SIGNATURE: &str = "f527422686555b6528a2e7f7ec82b2f5452b00303bb286f874e075ba778974a6d81adfff523642fc73b6960f759b92a3bad138be110bf59223e79fd1b5c6825d";

    #[test]
    fn rfc4231_case_1() {
        let key = [0x0b_u8; 20];
        assert_eq!(
            sign(&key, b"Hi There"),
            "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cdedaa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854"
        );
    }

    #[test]
    fn rfc4231_case_2() {
        assert_eq!(
            sign(b"Jefe", b"what do ya want for nothing?"),
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea2505549758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }

    #[test]
    fn sign_fixture_body() {
        assert_eq!(sign(b"k", br#"{"a":1}"#), FIXTURE_SIGNATURE);
    }

    #[test]
    fn sign_empty_payload() {
        let result = sign(b"k", b"");
        assert_eq!(
            result,
            "893ccbf5d0b335fcda6f625e4a59055a364d75a9251589428750782c116830a1af455efe1094c1901d0e8fd5beb6df64c6d5fe1c6f09be6ef47fb3987260cdd8"
        );
        assert_eq!(result, sign(b"k", b""));
    }

    #[test]
    fn sign_is_lowercase_hex_of_expected_length() {
        let result = sign(b"secret", b"message");
        assert_eq!(result.len(), 128); // SHA512 = 64 bytes = 128 hex chars
        assert!(result
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn verify_round_trip() {
        let cases: [(&[u8], &[u8]); 3] = [
            (b"k", br#"{"a":1}"#),
            (
                b"4SY6TNL8CK3VPRSBTHTRG2N8XXEGC6NL",
                br#"{"eventType":"SUCCESSFUL_TRANSACTION"}"#,
            ),
            (b"", b""),
        ];
        for (secret, payload) in cases {
            let signature = sign(secret, payload);
            assert!(verify(payload, secret, &signature));
        }
    }

    #[test]
    fn verify_rejects_other_strings() {
        let payload = br#"{"a":1}"#;
        assert!(!verify(payload, b"k", "deadbeef"));
        assert!(!verify(payload, b"k", ""));
        assert!(!verify(payload, b"k", &FIXTURE_SIGNATURE.to_uppercase()));
        assert!(!verify(payload, b"k", &format!("{FIXTURE_SIGNATURE} ")));
        assert!(!verify(payload, b"other", FIXTURE_SIGNATURE));
    }

    #[test]
    fn single_byte_flip_invalidates() {
        let payload = br#"{"transactionReference":"MNFY|20200903225338|000442"}"#.to_vec();
        let signature = sign(b"k", &payload);

        for i in 0..payload.len() {
            let mut tampered = payload.clone();
            tampered[i] ^= 0x01;
            assert!(!verify(&tampered, b"k", &signature), "flip at byte {i}");
        }
    }

    #[test]
    fn reserialized_body_does_not_verify() {
        let raw = br#"{ "b": 2, "a": 1 }"#;
        let signature = sign(b"k", raw);

        let value: serde_json::Value = serde_json::from_slice(raw).unwrap();
        let reserialized = serde_json::to_vec(&value).unwrap();

        assert!(verify(raw, b"k", &signature));
        assert!(!verify(&reserialized, b"k", &signature));
    }

    #[test]
    fn verify_strict_reports_mismatch() {
        let verifier = SignatureVerifier::<HmacSha512Signer>::default();
        assert!(verifier
            .verify_strict(br#"{"a":1}"#, b"k", FIXTURE_SIGNATURE)
            .is_ok());
        assert!(matches!(
            verifier.verify_strict(br#"{"a":1}"#, b"k", "deadbeef"),
            Err(MonnifyError::SignatureMismatch)
        ));
    }

    #[test]
    fn constant_time_eq_equal_inputs() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn constant_time_eq_different_inputs() {
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(!constant_time_eq(b"ab", b"abc"));
        assert!(!constant_time_eq(b"abc", b"ABC"));
    }

    #[test]
    fn transaction_hash_matches_reference() {
        assert_eq!(
            transaction_hash("secret", "pay-1", "100.00", "03/09/2020 10:53:39 PM", "MNFY|1"),
            "21c83f4ee714a814c67b7e7f528781919e1adb402e0018f36f85036b0e985ea9a16abb4ef3a19e9860a8656f7167a456174326281d9d78b7c583a47400acf46c"
        );
    }

    #[test]
    fn verify_transaction_hash_detects_changes() {
        let hash = transaction_hash("secret", "pay-1", "100.00", "03/09/2020 10:53:39 PM", "MNFY|1");
        assert!(verify_transaction_hash(
            "secret",
            "pay-1",
            "100.00",
            "03/09/2020 10:53:39 PM",
            "MNFY|1",
            &hash
        ));
        assert!(!verify_transaction_hash(
            "secret",
            "pay-1",
            "100.0",
            "03/09/2020 10:53:39 PM",
            "MNFY|1",
            &hash
        ));
    }

    #[test]
    fn shared_signer_verifies() {
        let signer: Arc<dyn Signer> = Arc::new(HmacSha512Signer);
        let verifier = SignatureVerifier::new(signer);
        assert!(verifier.verify(b"{\"a\":1}", b"k", FIXTURE_SIGNATURE));
        assert!(!verifier.verify(b"{\"a\":1}", b"k", "deadbeef"));
    }
}
