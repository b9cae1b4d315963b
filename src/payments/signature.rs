//! Razorpay payment signature verification.
//!
//! The checkout widget returns an HMAC-SHA256 signature computed with the
//! account's key secret. The signed message depends on what was paid for:
//!
//! - order: `order_id|payment_id`
//! - subscription: `payment_id|subscription_id`
//!
//! The operand order differs between the two and must not be normalised.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::PaymentReference;

type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded HMAC-SHA256 digest.
pub const SIGNATURE_HEX_LEN: usize = 64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("payment signature does not match")]
    Mismatch,
    #[error("payment signing key is invalid")]
    InvalidKey,
}

/// Builds the message the gateway signs for a payment.
pub fn canonical_message(payment_id: &str, reference: &PaymentReference) -> String {
    match reference {
        PaymentReference::Order(order_id) => format!("{}|{}", order_id, payment_id),
        PaymentReference::Subscription(subscription_id) => {
            format!("{}|{}", payment_id, subscription_id)
        }
    }
}

/// Verifies gateway signatures with the shared key secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Arc<str>,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self, message: &str) -> Result<HmacSha256, SignatureError> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| SignatureError::InvalidKey)?;
        mac.update(message.as_bytes());
        Ok(mac)
    }

    /// Hex-encoded HMAC-SHA256 of `message`.
    pub fn sign(&self, message: &str) -> Result<String, SignatureError> {
        Ok(hex::encode(self.mac(message)?.finalize().into_bytes()))
    }

    /// Checks `signature` against the expected digest in constant time.
    ///
    /// Only the exact lowercase hex form the gateway emits is accepted;
    /// anything else is a mismatch.
    pub fn verify(&self, message: &str, signature: &str) -> Result<(), SignatureError> {
        if !is_lowercase_hex_digest(signature) {
            return Err(SignatureError::Mismatch);
        }
        let provided = hex::decode(signature).map_err(|_| SignatureError::Mismatch)?;

        self.mac(message)?
            .verify_slice(&provided)
            .map_err(|_| SignatureError::Mismatch)
    }

    pub fn verify_payment(
        &self,
        payment_id: &str,
        reference: &PaymentReference,
        signature: &str,
    ) -> Result<(), SignatureError> {
        self.verify(&canonical_message(payment_id, reference), signature)
    }
}

fn is_lowercase_hex_digest(signature: &str) -> bool {
    signature.len() == SIGNATURE_HEX_LEN
        && signature
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"****")
            .finish()
    }
}
