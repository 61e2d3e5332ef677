//! Gateway payment signature verification.
//!
//! The checkout widget hands back `order_id`, `payment_id` and a signature.
//! The signature is the lowercase hex HMAC-SHA256 of `"{order_id}|{payment_id}"`
//! keyed with the merchant secret. Matching it is the only proof of payment
//! this service accepts.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verifies completion claims against the merchant secret.
#[derive(Clone)]
pub struct PaymentSignatureVerifier {
    secret: SecretString,
}

impl PaymentSignatureVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Hex signature the gateway would produce for this order/payment pair.
    pub fn expected_signature(&self, order_id: &str, payment_id: &str) -> String {
        // HMAC accepts keys of any length, so this never fails.
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(order_id.as_bytes());
        mac.update(b"|");
        mac.update(payment_id.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Returns true iff `claimed` equals the expected signature.
    pub fn verify(&self, order_id: &str, payment_id: &str, claimed: &str) -> bool {
        let expected = self.expected_signature(order_id, payment_id);
        constant_time_compare(expected.as_bytes(), claimed.as_bytes())
    }
}

impl std::fmt::Debug for PaymentSignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentSignatureVerifier")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Signs an order/payment pair the way the gateway does. Test helper.
#[cfg(test)]
pub fn sign_for_test(secret: &str, order_id: &str, payment_id: &str) -> String {
    PaymentSignatureVerifier::new(SecretString::new(secret.to_string()))
        .expected_signature(order_id, payment_id)
}
