//! Payment gateway port.
//!
//! Two calls: open a hosted payment session, and ask the gateway how a
//! payment ended. Implementations are stateless; they never touch local
//! storage and never retry on their own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::payment::{GatewayStatus, PaymentError, PaymentReference};

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a payment session for `request.reference`.
    ///
    /// # Errors
    ///
    /// `GatewayUnavailable` on transport error, timeout, or a rejected call.
    async fn initialize(&self, request: InitializePaymentRequest) -> Result<PaymentSession, PaymentError>;

    /// Fetches the gateway-side status of a payment.
    ///
    /// # Errors
    ///
    /// `GatewayUnavailable` on transport error, timeout, or a rejected call.
    async fn verify(&self, reference: &PaymentReference) -> Result<GatewayVerification, PaymentError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializePaymentRequest {
    pub email: String,
    /// Amount in minor units.
    pub amount_minor: i64,
    pub currency: String,
    pub reference: PaymentReference,
    pub callback_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Hosted checkout the payer is redirected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub authorization_url: String,
    pub access_code: Option<String>,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayVerification {
    pub status: GatewayStatus,
    pub reference: String,
    pub amount_minor: Option<i64>,
    /// Full gateway response body, kept as audit evidence.
    pub raw: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn PaymentGateway) {}
}
