//! GetSubscriptionHandler - Query handler for one subscription, owner only.

use std::sync::Arc;

use crate::domain::foundation::{SubscriptionId, UserId};
use crate::domain::payment::PaymentError;
use crate::ports::{PlanRepository, SubscriptionRepository};

use super::CurrentSubscription;

#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub user_id: UserId,
    pub subscription_id: SubscriptionId,
}

pub struct GetSubscriptionHandler {
    plans: Arc<dyn PlanRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl GetSubscriptionHandler {
    pub fn new(plans: Arc<dyn PlanRepository>, subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { plans, subscriptions }
    }

    pub async fn handle(&self, query: GetSubscriptionQuery) -> Result<CurrentSubscription, PaymentError> {
        let subscription = self
            .subscriptions
            .find_by_id(&query.subscription_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Subscription", query.subscription_id))?;
        if subscription.user_id != query.user_id {
            return Err(PaymentError::forbidden(format!(
                "subscription {} belongs to another user",
                subscription.id
            )));
        }

        let plan = self.plans.find_by_id(&subscription.plan_id).await?;
        Ok(CurrentSubscription { subscription, plan })
    }
}
