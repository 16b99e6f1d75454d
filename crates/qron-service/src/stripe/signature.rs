//! Webhook delivery signatures.
//!
//! The gateway signs each delivery with a `stripe-signature` header of the
//! form `t=timestamp,v1=hex[,v1=hex...]`, where every `v1` candidate is
//! HMAC-SHA256 over `"{timestamp}.{body}"` under the shared signing secret.
//! Verification recomputes the digest from the raw body and compares in
//! constant time, so the check leaks nothing about the expected value.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::client::StripeError;

type HmacSha256 = Hmac<Sha256>;

/// Verify a signature header against the raw delivery body.
///
/// Accepts the delivery when any `v1` candidate matches the recomputed
/// digest; the gateway sends multiple candidates while a secret is being
/// rolled.
pub(super) fn verify(secret: &str, payload: &str, header: &str) -> Result<(), StripeError> {
    let mut timestamp = None;
    let mut candidates = Vec::new();

    for part in header.split(',') {
        match part.split_once('=') {
            Some(("t", value)) => timestamp = Some(value),
            Some(("v1", value)) => candidates.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(StripeError::InvalidSignature)?;
    if candidates.is_empty() {
        return Err(StripeError::InvalidSignature);
    }

    let expected = digest(secret, timestamp, payload);
    if candidates.iter().any(|sig| matches_constant_time(&expected, sig)) {
        Ok(())
    } else {
        Err(StripeError::InvalidSignature)
    }
}

/// Build a signed `stripe-signature` header for `payload`.
///
/// The inverse of verification; lets tests and local tooling construct
/// deliveries the webhook handler will accept without a live gateway.
#[must_use]
pub fn sign_header(secret: &str, timestamp: &str, payload: &str) -> String {
    format!("t={timestamp},v1={}", digest(secret, timestamp, payload))
}

/// Hex-encoded HMAC-SHA256 over `"{timestamp}.{payload}"`.
fn digest(secret: &str, timestamp: &str, payload: &str) -> String {
    // HMAC-SHA256 accepts keys of any size per RFC 2104, so `new_from_slice`
    // cannot fail here.
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC-SHA256 accepts any key size");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time equality over the hex digests.
fn matches_constant_time(expected: &str, candidate: &str) -> bool {
    if expected.len() != candidate.len() {
        return false;
    }
    expected
        .bytes()
        .zip(candidate.bytes())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
