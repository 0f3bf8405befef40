//! HandleGatewayWebhookHandler - Entry point for signed gateway callbacks.
//!
//! The signature is checked against the exact bytes received before the
//! body is parsed. A verified event is routed to order or subscription
//! settlement by its reference prefix.

use std::sync::Arc;

use crate::domain::payment::{
    OutcomeKind, PaymentError, PaymentReference, ReferenceKind, WebhookAction,
    WebhookSignatureVerifier,
};
use crate::ports::SettlementRequest;

use super::super::billing::SettleSubscriptionPaymentHandler;
use super::super::orders::SettleOrderPaymentHandler;

#[derive(Debug, Clone)]
pub struct HandleGatewayWebhookCommand {
    /// Raw request body, byte for byte.
    pub payload: Vec<u8>,
    /// Value of the signature header, if sent.
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleGatewayWebhookResult {
    Processed {
        reference: PaymentReference,
        kind: ReferenceKind,
        outcome: OutcomeKind,
    },
    Ignored {
        event: String,
    },
}

pub struct HandleGatewayWebhookHandler {
    verifier: WebhookSignatureVerifier,
    settle_order: Arc<SettleOrderPaymentHandler>,
    settle_subscription: Arc<SettleSubscriptionPaymentHandler>,
}

impl HandleGatewayWebhookHandler {
    pub fn new(
        verifier: WebhookSignatureVerifier,
        settle_order: Arc<SettleOrderPaymentHandler>,
        settle_subscription: Arc<SettleSubscriptionPaymentHandler>,
    ) -> Self {
        Self {
            verifier,
            settle_order,
            settle_subscription,
        }
    }

    /// # Errors
    ///
    /// - `SignatureInvalid` - nothing was parsed or written
    /// - `PayloadMalformed` - signed but unreadable body
    /// - `ReferenceNotFound` - no local transaction carries the reference
    pub async fn handle(
        &self,
        cmd: HandleGatewayWebhookCommand,
    ) -> Result<HandleGatewayWebhookResult, PaymentError> {
        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, cmd.signature.as_deref())
            .map_err(|e| {
                tracing::warn!(error = %e, bytes = cmd.payload.len(), "Rejected gateway webhook");
                e
            })?;

        let (reference, status, customer) = match event.action()? {
            WebhookAction::Ignore { event } => {
                tracing::debug!(event = %event, "Ignoring gateway webhook event");
                return Ok(HandleGatewayWebhookResult::Ignored { event });
            }
            WebhookAction::Settle {
                reference,
                status,
                customer,
            } => (reference, status, customer),
        };

        let kind = reference
            .kind()
            .ok_or_else(|| PaymentError::reference_not_found(reference.as_str()))?;
        let raw: serde_json::Value = serde_json::from_slice(&cmd.payload)
            .map_err(|e| PaymentError::payload_malformed(e.to_string()))?;
        let request = SettlementRequest::new(reference.clone(), status)
            .with_customer(customer)
            .with_gateway_response(raw);

        tracing::info!(event = %event.event, reference = %reference, "Gateway webhook verified");

        let outcome = match kind {
            ReferenceKind::Order => self.settle_order.handle(request).await?.kind(),
            ReferenceKind::Subscription => self.settle_subscription.handle(request).await?.kind(),
        };

        Ok(HandleGatewayWebhookResult::Processed {
            reference,
            kind,
            outcome,
        })
    }
}
