//! CancelSubscriptionHandler - Ends a subscription immediately.

use std::sync::Arc;

use crate::domain::billing::Subscription;
use crate::domain::foundation::{SubscriptionId, Timestamp, UserId};
use crate::domain::payment::PaymentError;
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub user_id: UserId,
    pub subscription_id: SubscriptionId,
}

#[derive(Debug, Clone)]
pub struct CancelSubscriptionResult {
    pub subscription: Subscription,
}

/// Cancels now; `end_date` becomes the cancellation time. No refund.
pub struct CancelSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl CancelSubscriptionHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, PaymentError> {
        let mut subscription = self
            .subscriptions
            .find_by_id(&cmd.subscription_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Subscription", cmd.subscription_id))?;
        if subscription.user_id != cmd.user_id {
            return Err(PaymentError::forbidden(format!(
                "subscription {} belongs to another user",
                subscription.id
            )));
        }

        subscription.cancel(Timestamp::now())?;
        self.subscriptions.update(&subscription).await?;

        tracing::info!(subscription_id = %subscription.id, "Subscription canceled");
        Ok(CancelSubscriptionResult { subscription })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMarketplaceStore;
    use crate::domain::billing::{PlanInterval, SubscriptionStatus};
    use crate::domain::foundation::PlanId;

    async fn active(store: &InMemoryMarketplaceStore) -> Subscription {
        let mut subscription = Subscription::create(UserId::new(), PlanId::new());
        subscription.activate(PlanInterval::Monthly, Timestamp::now()).unwrap();
        SubscriptionRepository::save(store, &subscription).await.unwrap();
        subscription
    }

    #[tokio::test]
    async fn owner_cancels() {
        let store = InMemoryMarketplaceStore::new();
        let subscription = active(&store).await;
        let handler = CancelSubscriptionHandler::new(Arc::new(store));

        let result = handler
            .handle(CancelSubscriptionCommand {
                user_id: subscription.user_id,
                subscription_id: subscription.id,
            })
            .await
            .unwrap();

        assert_eq!(result.subscription.status, SubscriptionStatus::Canceled);
        assert!(!result.subscription.is_active());
    }

    #[tokio::test]
    async fn stranger_cannot_cancel() {
        let store = InMemoryMarketplaceStore::new();
        let subscription = active(&store).await;
        let handler = CancelSubscriptionHandler::new(Arc::new(store));

        let err = handler
            .handle(CancelSubscriptionCommand {
                user_id: UserId::new(),
                subscription_id: subscription.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Forbidden(_)));
    }
}
