//! One payment attempt for an order.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{OrderId, StateMachine, Timestamp, TransactionId, ValidationError};
use crate::domain::payment::{PaymentError, PaymentReference, ReferenceKind, TransactionStatus};

use super::Order;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderTransaction {
    pub id: TransactionId,
    pub order_id: OrderId,
    pub reference: PaymentReference,
    /// Charged amount in gateway minor units.
    pub amount_minor: i64,
    pub currency: String,
    pub status: TransactionStatus,
    pub metadata: serde_json::Value,
    /// Last verify response or webhook body seen for this payment.
    pub gateway_response: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub verified_at: Option<Timestamp>,
}

impl OrderTransaction {
    /// Opens a payment attempt for an accepted order.
    ///
    /// # Errors
    ///
    /// Fails if the order is not `ACCEPTED` or its price has no positive
    /// minor-unit amount.
    pub fn initialize(order: &Order, currency: impl Into<String>) -> Result<Self, PaymentError> {
        order.ensure_payable()?;

        let amount_minor = order.total_price.to_minor_units()?;
        if amount_minor <= 0 {
            return Err(ValidationError::not_positive("amount", amount_minor).into());
        }

        let reference = PaymentReference::generate(ReferenceKind::Order);
        Ok(Self {
            id: TransactionId::new(),
            order_id: order.id,
            metadata: serde_json::json!({
                "order_id": order.id.to_string(),
                "reference": reference.as_str(),
            }),
            reference,
            amount_minor,
            currency: currency.into(),
            status: TransactionStatus::Initialized,
            gateway_response: None,
            created_at: Timestamp::now(),
            verified_at: None,
        })
    }

    /// Stores the gateway's checkout for this attempt so a repeated
    /// initialize can hand it back instead of opening another charge.
    pub fn record_checkout(&mut self, authorization_url: &str, access_code: Option<&str>) {
        if let Some(metadata) = self.metadata.as_object_mut() {
            metadata.insert("authorization_url".into(), authorization_url.into());
            if let Some(code) = access_code {
                metadata.insert("access_code".into(), code.into());
            }
        }
    }

    /// Checkout recorded by [`record_checkout`](Self::record_checkout), if any.
    pub fn checkout(&self) -> Option<(String, Option<String>)> {
        let url = self.metadata.get("authorization_url")?.as_str()?;
        let code = self
            .metadata
            .get("access_code")
            .and_then(|c| c.as_str())
            .map(str::to_string);
        Some((url.to_string(), code))
    }

    /// Anomaly recorded when a captured charge could not be applied.
    pub fn anomaly(&self) -> Option<&serde_json::Value> {
        self.metadata.get("anomaly")
    }

    /// Moves to a terminal status, recording the gateway evidence.
    pub fn settle(
        &mut self,
        target: TransactionStatus,
        gateway_response: Option<serde_json::Value>,
        at: Timestamp,
    ) -> Result<(), PaymentError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|e| PaymentError::invalid_transition("order transaction", e))?;
        if gateway_response.is_some() {
            self.gateway_response = gateway_response;
        }
        self.verified_at = Some(at);
        Ok(())
    }
}
