//! Gateway webhook signature verification.
//!
//! The gateway signs each webhook with HMAC-SHA512 over the raw request body,
//! keyed by the account secret key, and sends the lowercase hex digest in the
//! `X-Paystack-Signature` header. Verification runs on the unmodified bytes
//! before anything is parsed or read from storage.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use super::errors::PaymentError;
use super::webhook::GatewayWebhookEvent;

type HmacSha512 = Hmac<Sha512>;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "X-Paystack-Signature";

/// Verifier for inbound gateway webhooks.
#[derive(Clone)]
pub struct WebhookSignatureVerifier {
    secret: SecretString,
}

impl WebhookSignatureVerifier {
    /// Creates a verifier keyed by the gateway secret.
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Checks the signature of a raw body.
    ///
    /// # Errors
    ///
    /// `SignatureInvalid` when the secret is not configured, the header is
    /// missing or not hex, or the digest does not match.
    pub fn verify(&self, payload: &[u8], signature: Option<&str>) -> Result<(), PaymentError> {
        let secret = self.secret.expose_secret();
        if secret.is_empty() {
            tracing::error!("Webhook received but no gateway secret is configured");
            return Err(PaymentError::SignatureInvalid);
        }

        let provided = signature
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(PaymentError::SignatureInvalid)?;
        let provided = hex::decode(provided.to_ascii_lowercase())
            .map_err(|_| PaymentError::SignatureInvalid)?;

        let expected = compute_signature(secret.as_bytes(), payload)?;
        if !constant_time_compare(&expected, &provided) {
            return Err(PaymentError::SignatureInvalid);
        }

        Ok(())
    }

    /// Verifies the signature, then parses the event.
    ///
    /// # Errors
    ///
    /// - `SignatureInvalid` - signature check failed (body never parsed)
    /// - `PayloadMalformed` - signature fine, body is not a valid event
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<GatewayWebhookEvent, PaymentError> {
        self.verify(payload, signature)?;
        GatewayWebhookEvent::from_slice(payload)
    }
}

fn compute_signature(key: &[u8], payload: &[u8]) -> Result<Vec<u8>, PaymentError> {
    let mut mac = HmacSha512::new_from_slice(key).map_err(|_| PaymentError::SignatureInvalid)?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Signs a payload the way the gateway does.
///
/// Used by tests and local tooling that replay webhooks.
pub fn sign_payload(secret: &str, payload: &[u8]) -> String {
    match compute_signature(secret.as_bytes(), payload) {
        Ok(digest) => hex::encode(digest),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "sk_test_webhook_secret";
    const BODY: &[u8] = br#"{"event":"charge.success","data":{"reference":"ORD_abc","status":"success"}}"#;

    fn verifier() -> WebhookSignatureVerifier {
        WebhookSignatureVerifier::new(SecretString::new(TEST_SECRET.to_string()))
    }

    // ══════════════════════════════════════════════════════════════
    // Signature Checks
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn accepts_valid_signature() {
        let signature = sign_payload(TEST_SECRET, BODY);
        assert!(verifier().verify(BODY, Some(&signature)).is_ok());
    }

    #[test]
    fn accepts_uppercase_hex() {
        let signature = sign_payload(TEST_SECRET, BODY).to_uppercase();
        assert!(verifier().verify(BODY, Some(&signature)).is_ok());
    }

    #[test]
    fn signature_is_128_hex_chars() {
        assert_eq!(sign_payload(TEST_SECRET, BODY).len(), 128);
    }

    #[test]
    fn rejects_tampered_body() {
        let signature = sign_payload(TEST_SECRET, BODY);
        let tampered = br#"{"event":"charge.success","data":{"reference":"ORD_abd","status":"success"}}"#;
        assert_eq!(
            verifier().verify(tampered, Some(&signature)),
            Err(PaymentError::SignatureInvalid)
        );
    }

    #[test]
    fn rejects_signature_from_other_secret() {
        let signature = sign_payload("sk_test_other", BODY);
        assert_eq!(
            verifier().verify(BODY, Some(&signature)),
            Err(PaymentError::SignatureInvalid)
        );
    }

    #[test]
    fn rejects_missing_header() {
        assert_eq!(verifier().verify(BODY, None), Err(PaymentError::SignatureInvalid));
        assert_eq!(verifier().verify(BODY, Some("  ")), Err(PaymentError::SignatureInvalid));
    }

    #[test]
    fn rejects_non_hex_header() {
        assert_eq!(
            verifier().verify(BODY, Some("not-hex-at-all")),
            Err(PaymentError::SignatureInvalid)
        );
    }

    #[test]
    fn rejects_everything_without_configured_secret() {
        let unconfigured = WebhookSignatureVerifier::new(SecretString::new(String::new()));
        let signature = sign_payload("", BODY);
        assert_eq!(
            unconfigured.verify(BODY, Some(&signature)),
            Err(PaymentError::SignatureInvalid)
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Verify Then Parse
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn bad_signature_wins_over_bad_json() {
        let body = b"{not json";
        assert_eq!(
            verifier().verify_and_parse(body, Some("00")).unwrap_err(),
            PaymentError::SignatureInvalid
        );
    }

    #[test]
    fn valid_signature_with_bad_json_is_malformed() {
        let body = b"{not json";
        let signature = sign_payload(TEST_SECRET, body);
        assert!(matches!(
            verifier().verify_and_parse(body, Some(&signature)),
            Err(PaymentError::PayloadMalformed(_))
        ));
    }

    #[test]
    fn valid_signature_parses_event() {
        let signature = sign_payload(TEST_SECRET, BODY);
        let event = verifier().verify_and_parse(BODY, Some(&signature)).unwrap();
        assert_eq!(event.event, "charge.success");
        assert_eq!(event.data.reference, "ORD_abc");
    }
}
