//! GetCurrentSubscriptionHandler - Query handler for a user's active subscription.

use std::sync::Arc;

use crate::domain::billing::{Plan, Subscription};
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::payment::PaymentError;
use crate::ports::{PlanRepository, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct GetCurrentSubscriptionQuery {
    pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct CurrentSubscription {
    pub subscription: Subscription,
    pub plan: Option<Plan>,
}

pub struct GetCurrentSubscriptionHandler {
    plans: Arc<dyn PlanRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl GetCurrentSubscriptionHandler {
    pub fn new(plans: Arc<dyn PlanRepository>, subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { plans, subscriptions }
    }

    /// The most recently started subscription that is active now.
    pub async fn handle(
        &self,
        query: GetCurrentSubscriptionQuery,
    ) -> Result<Option<CurrentSubscription>, PaymentError> {
        let Some(subscription) = self
            .subscriptions
            .find_current_for_user(&query.user_id, Timestamp::now())
            .await?
        else {
            return Ok(None);
        };
        let plan = self.plans.find_by_id(&subscription.plan_id).await?;
        Ok(Some(CurrentSubscription { subscription, plan }))
    }
}
