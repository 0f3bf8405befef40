//! CreateSubscriptionHandler - Subscribes a user to a plan, unpaid.

use std::sync::Arc;

use crate::domain::billing::{Plan, Subscription};
use crate::domain::foundation::{PlanId, UserId};
use crate::domain::payment::PaymentError;
use crate::ports::{PlanRepository, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct CreateSubscriptionCommand {
    pub user_id: UserId,
    pub plan_id: PlanId,
}

#[derive(Debug, Clone)]
pub struct CreateSubscriptionResult {
    pub subscription: Subscription,
    pub plan: Plan,
}

/// Creates an `inactive` subscription. Activation happens on payment.
pub struct CreateSubscriptionHandler {
    plans: Arc<dyn PlanRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl CreateSubscriptionHandler {
    pub fn new(plans: Arc<dyn PlanRepository>, subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { plans, subscriptions }
    }

    pub async fn handle(
        &self,
        cmd: CreateSubscriptionCommand,
    ) -> Result<CreateSubscriptionResult, PaymentError> {
        let plan = self
            .plans
            .find_by_id(&cmd.plan_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Plan", cmd.plan_id))?;

        let subscription = Subscription::create(cmd.user_id, plan.id);
        self.subscriptions.save(&subscription).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            plan = %plan.name,
            "Subscription created"
        );
        Ok(CreateSubscriptionResult { subscription, plan })
    }
}
