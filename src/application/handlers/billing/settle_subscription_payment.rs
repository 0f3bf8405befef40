//! SettleSubscriptionPaymentHandler - Applies a gateway outcome to a
//! subscription payment.

use std::sync::Arc;

use crate::application::NotificationDispatcher;
use crate::domain::billing::SubscriptionSettlement;
use crate::domain::payment::{PaymentError, SettlementOutcome};
use crate::ports::{Notification, SettlementRequest, SettlementStore};

pub struct SettleSubscriptionPaymentHandler {
    store: Arc<dyn SettlementStore>,
    notifications: NotificationDispatcher,
}

impl SettleSubscriptionPaymentHandler {
    pub fn new(store: Arc<dyn SettlementStore>, notifications: NotificationDispatcher) -> Self {
        Self {
            store,
            notifications,
        }
    }

    pub async fn handle(
        &self,
        request: SettlementRequest,
    ) -> Result<SettlementOutcome<SubscriptionSettlement>, PaymentError> {
        let reference = request.reference.clone();
        let outcome = self.store.settle_subscription_payment(request).await.map_err(|e| {
            tracing::error!(reference = %reference, error = %e, "Subscription settlement failed");
            e
        })?;

        match &outcome {
            SettlementOutcome::Settled(settlement) => {
                tracing::info!(
                    reference = %reference,
                    subscription_id = %settlement.subscription_id,
                    plan = %settlement.plan_name,
                    "Subscription payment settled"
                );
                self.notifications.dispatch(Notification::SubscriptionActivated {
                    user_id: settlement.user_id,
                    subscription_id: settlement.subscription_id,
                    plan_name: settlement.plan_name.clone(),
                });
            }
            other => {
                tracing::info!(reference = %reference, outcome = %other.kind(), "Subscription settlement finished");
            }
        }

        Ok(outcome)
    }
}
