//! Webhook signature computation and verification

use crate::{Result, SigningAlgorithm, WebhookError};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Sha256, Sha512};

type HmacSha256 = Hmac<Sha256>;
type HmacSha512 = Hmac<Sha512>;

/// Verifies that a payload was signed by a holder of the shared secret.
///
/// The signature is a keyed hash over the exact bytes received, encoded as
/// lower-case hex. Payloads are never re-encoded before hashing, so the
/// caller must hand over the body exactly as it arrived on the wire.
#[derive(Debug)]
pub struct WebhookSignature {
    secret: SecretString,
    algorithm: SigningAlgorithm,
}

impl WebhookSignature {
    /// Create a verifier using HMAC-SHA256
    ///
    /// Fails with [`WebhookError::ConfigError`] if the secret is empty or
    /// whitespace-only.
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        Self::with_algorithm(secret, SigningAlgorithm::default())
    }

    /// Create a verifier using a specific signing algorithm
    pub fn with_algorithm(secret: impl Into<String>, algorithm: SigningAlgorithm) -> Result<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(WebhookError::ConfigError(
                "webhook secret must not be empty".to_string(),
            ));
        }

        Ok(Self {
            secret: SecretString::new(secret.into()),
            algorithm,
        })
    }

    /// Compute the HMAC-SHA256 signature of `payload` under `secret`
    pub fn compute_signature(secret: &str, payload: &[u8]) -> String {
        compute_hmac(SigningAlgorithm::HmacSha256, secret.as_bytes(), payload)
    }

    /// The algorithm this verifier signs with
    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Sign a payload with the bound secret
    pub fn sign(&self, payload: &[u8]) -> String {
        compute_hmac(
            self.algorithm,
            self.secret.expose_secret().as_bytes(),
            payload,
        )
    }

    /// Check a supplied signature against the payload.
    ///
    /// Returns `false` for blank payloads, blank signatures and mismatches.
    /// The supplied hex may be upper- or lower-case.
    pub fn validate(&self, payload: &[u8], signature: &str) -> bool {
        if is_blank(payload) {
            return false;
        }

        let signature = signature.trim();
        if signature.is_empty() {
            return false;
        }

        let expected = self.sign(payload);
        constant_time_compare(&signature.to_ascii_lowercase(), &expected)
    }
}

fn compute_hmac(algorithm: SigningAlgorithm, key: &[u8], data: &[u8]) -> String {
    match algorithm {
        SigningAlgorithm::HmacSha256 => {
            let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take any size key");
            mac.update(data);
            hex::encode(mac.finalize().into_bytes())
        }
        SigningAlgorithm::HmacSha512 => {
            let mut mac = HmacSha512::new_from_slice(key).expect("HMAC can take any size key");
            mac.update(data);
            hex::encode(mac.finalize().into_bytes())
        }
    }
}

fn is_blank(payload: &[u8]) -> bool {
    payload.iter().all(|b| b.is_ascii_whitespace())
}

/// Constant-time string comparison to prevent timing attacks
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Header names carrying webhook signatures
pub mod headers {
    /// The default signature header name
    pub const SIGNATURE: &str = "X-Webhook-Signature";
}
