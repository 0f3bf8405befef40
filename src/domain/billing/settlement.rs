//! Side effects of a successful subscription payment.
//!
//! Same contract as order settlement: the caller holds the locks, persists
//! every mutated row together, and writes nothing on error.

use serde::Serialize;

use crate::domain::foundation::{SubscriptionId, Timestamp, UserId};
use crate::domain::payment::{PaymentError, PaymentReference, TransactionStatus};

use super::{BillingTransaction, Plan, Subscription};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionSettlement {
    pub reference: PaymentReference,
    pub subscription_id: SubscriptionId,
    pub user_id: UserId,
    pub plan_name: String,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
}

/// Marks the payment successful and activates the subscription from `at`.
pub fn settle_subscription_payment(
    transaction: &mut BillingTransaction,
    subscription: &mut Subscription,
    plan: &Plan,
    customer: Option<String>,
    gateway_response: Option<serde_json::Value>,
    at: Timestamp,
) -> Result<SubscriptionSettlement, PaymentError> {
    if transaction.subscription_id != subscription.id || subscription.plan_id != plan.id {
        return Err(PaymentError::infrastructure(format!(
            "settlement rows for {} do not belong together",
            transaction.reference
        )));
    }

    transaction.settle(TransactionStatus::Success, gateway_response, at)?;
    subscription.activate(plan.interval, at)?;
    subscription.external_reference = Some(transaction.reference.to_string());
    if customer.is_some() {
        subscription.external_customer = customer;
    }

    Ok(SubscriptionSettlement {
        reference: transaction.reference.clone(),
        subscription_id: subscription.id,
        user_id: subscription.user_id,
        plan_name: plan.name.clone(),
        start_date: subscription.start_date,
        end_date: subscription.end_date,
    })
}
