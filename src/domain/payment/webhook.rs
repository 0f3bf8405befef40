//! Inbound gateway webhook events.

use serde::Deserialize;

use super::errors::PaymentError;
use super::reference::PaymentReference;
use super::status::GatewayStatus;

/// Raw webhook body: `{event, data: {reference, status, metadata, customer}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayWebhookEvent {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    pub reference: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub customer: Option<WebhookCustomer>,
}

/// Gateway-side customer record attached to a charge.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookCustomer {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub customer_code: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl WebhookCustomer {
    /// Stable gateway customer identifier, preferring the customer code.
    pub fn external_id(&self) -> Option<String> {
        if let Some(code) = self.customer_code.as_ref().filter(|c| !c.is_empty()) {
            return Some(code.clone());
        }
        match &self.id {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// What a verified webhook asks us to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookAction {
    /// Settle the referenced transaction with the reported outcome.
    Settle {
        reference: PaymentReference,
        status: GatewayStatus,
        customer: Option<String>,
    },
    /// Event type we do not act on; acknowledged as-is.
    Ignore { event: String },
}

impl GatewayWebhookEvent {
    /// Parses a body whose signature has already been verified.
    pub fn from_slice(payload: &[u8]) -> Result<Self, PaymentError> {
        serde_json::from_slice(payload).map_err(|e| PaymentError::payload_malformed(e.to_string()))
    }

    /// Classifies the event.
    pub fn action(&self) -> Result<WebhookAction, PaymentError> {
        let status = match self.event.as_str() {
            "charge.success" => GatewayStatus::Success,
            "charge.failed" => GatewayStatus::Failed,
            other => {
                return Ok(WebhookAction::Ignore {
                    event: other.to_string(),
                })
            }
        };

        let reference = PaymentReference::parse(self.data.reference.as_str())
            .map_err(|e| PaymentError::payload_malformed(e.to_string()))?;

        Ok(WebhookAction::Settle {
            reference,
            status,
            customer: self.data.customer.as_ref().and_then(WebhookCustomer::external_id),
        })
    }
}
