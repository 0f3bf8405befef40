//! Subscription payment attempts.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    StateMachine, SubscriptionId, Timestamp, TransactionId, UserId, ValidationError,
};
use crate::domain::payment::{PaymentError, PaymentReference, ReferenceKind, TransactionStatus};

use super::{Plan, Subscription};

/// # Invariants
///
/// - `reference` is globally unique and never reassigned
/// - `initialized → {success, failed}`, terminal once reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingTransaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub subscription_id: SubscriptionId,
    pub reference: PaymentReference,
    pub amount_minor: i64,
    pub currency: String,
    pub status: TransactionStatus,
    pub metadata: serde_json::Value,
    pub gateway_response: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub verified_at: Option<Timestamp>,
}

impl BillingTransaction {
    /// Opens a payment attempt for a subscription's plan price.
    pub fn initialize(
        subscription: &Subscription,
        plan: &Plan,
        currency: impl Into<String>,
    ) -> Result<Self, PaymentError> {
        if subscription.plan_id != plan.id {
            return Err(PaymentError::validation(
                "plan_id",
                "plan does not match the subscription",
            ));
        }
        if plan.price_minor <= 0 {
            return Err(ValidationError::not_positive("amount", plan.price_minor).into());
        }

        Ok(Self {
            id: TransactionId::new(),
            user_id: subscription.user_id,
            subscription_id: subscription.id,
            reference: PaymentReference::generate(ReferenceKind::Subscription),
            amount_minor: plan.price_minor,
            currency: currency.into(),
            status: TransactionStatus::Initialized,
            metadata: serde_json::json!({ "subscription_id": subscription.id.to_string() }),
            gateway_response: None,
            created_at: Timestamp::now(),
            verified_at: None,
        })
    }

    pub fn settle(
        &mut self,
        target: TransactionStatus,
        gateway_response: Option<serde_json::Value>,
        at: Timestamp,
    ) -> Result<(), PaymentError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|e| PaymentError::invalid_transition("billing transaction", e))?;
        if gateway_response.is_some() {
            self.gateway_response = gateway_response;
        }
        self.verified_at = Some(at);
        Ok(())
    }
}
