//! ExpireLapsedSubscriptionsHandler - Sweeps active subscriptions past
//! their end date.

use std::sync::Arc;

use crate::domain::foundation::{SubscriptionId, Timestamp};
use crate::domain::payment::PaymentError;
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone)]
pub struct ExpireLapsedSubscriptionsCommand {
    pub now: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub struct ExpireLapsedSubscriptionsResult {
    pub expired: Vec<SubscriptionId>,
}

pub struct ExpireLapsedSubscriptionsHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl ExpireLapsedSubscriptionsHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    /// Cancels each lapsed subscription, keeping its original `end_date`.
    /// A row that fails to update is logged and skipped.
    pub async fn handle(
        &self,
        cmd: ExpireLapsedSubscriptionsCommand,
    ) -> Result<ExpireLapsedSubscriptionsResult, PaymentError> {
        let mut result = ExpireLapsedSubscriptionsResult::default();

        for mut subscription in self.subscriptions.find_lapsed(cmd.now).await? {
            if !subscription.expire_if_lapsed(cmd.now)? {
                continue;
            }
            match self.subscriptions.update(&subscription).await {
                Ok(()) => result.expired.push(subscription.id),
                Err(error) => {
                    tracing::warn!(subscription_id = %subscription.id, %error, "Could not expire subscription");
                }
            }
        }

        if !result.expired.is_empty() {
            tracing::info!(count = result.expired.len(), "Lapsed subscriptions expired");
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMarketplaceStore;
    use crate::domain::billing::{PlanInterval, Subscription, SubscriptionStatus};
    use crate::domain::foundation::{PlanId, UserId};

    #[tokio::test]
    async fn expires_only_lapsed_rows() {
        let store = InMemoryMarketplaceStore::new();
        let now = Timestamp::now();
        let mut lapsed = Subscription::create(UserId::new(), PlanId::new());
        lapsed.activate(PlanInterval::Monthly, now.add_days(-40)).unwrap();
        let mut live = Subscription::create(UserId::new(), PlanId::new());
        live.activate(PlanInterval::Monthly, now.add_days(-2)).unwrap();
        SubscriptionRepository::save(&store, &lapsed).await.unwrap();
        SubscriptionRepository::save(&store, &live).await.unwrap();
        let handler = ExpireLapsedSubscriptionsHandler::new(Arc::new(store.clone()));

        let result = handler
            .handle(ExpireLapsedSubscriptionsCommand { now })
            .await
            .unwrap();

        assert_eq!(result.expired, vec![lapsed.id]);
        let stored = SubscriptionRepository::find_by_id(&store, &lapsed.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Canceled);
        assert_eq!(stored.end_date, lapsed.end_date);
    }
}
