//! Paystack request and response bodies.

use serde::{Deserialize, Serialize};

/// Every Paystack response is wrapped in this envelope.
#[derive(Debug, Deserialize)]
pub(super) struct Envelope<T> {
    pub status: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

#[derive(Debug, Serialize)]
pub(super) struct InitializeBody<'a> {
    pub email: &'a str,
    /// Minor units, sent as a string the way Paystack documents it.
    pub amount: String,
    pub reference: &'a str,
    pub currency: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'a serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct InitializeData {
    pub authorization_url: String,
    pub access_code: Option<String>,
    pub reference: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct VerifyData {
    pub status: String,
    pub reference: String,
    pub amount: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_body_omits_absent_optionals() {
        let body = InitializeBody {
            email: "buyer@example.com",
            amount: "1000000".to_string(),
            reference: "ORD_abc",
            currency: "NGN",
            callback_url: None,
            metadata: None,
        };
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["amount"], "1000000");
        assert!(json.get("callback_url").is_none());
        assert!(json.get("metadata").is_none());
    }

    #[test]
    fn verify_envelope_parses() {
        let raw = r#"{"status":true,"message":"Verification successful",
            "data":{"status":"success","reference":"ORD_abc","amount":1000000,"gateway_response":"Approved"}}"#;
        let envelope: Envelope<VerifyData> = serde_json::from_str(raw).unwrap();

        assert!(envelope.status);
        let data = envelope.data.unwrap();
        assert_eq!(data.status, "success");
        assert_eq!(data.amount, Some(1_000_000));
    }

    #[test]
    fn rejected_envelope_has_no_data() {
        let raw = r#"{"status":false,"message":"Transaction reference not found"}"#;
        let envelope: Envelope<VerifyData> = serde_json::from_str(raw).unwrap();

        assert!(!envelope.status);
        assert!(envelope.data.is_none());
    }
}
