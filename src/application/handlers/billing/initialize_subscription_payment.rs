//! InitializeSubscriptionPaymentHandler - Starts paying for a subscription.

use std::sync::Arc;

use crate::domain::billing::{BillingTransaction, Subscription};
use crate::domain::foundation::{SubscriptionId, Timestamp, UserId};
use crate::domain::payment::{PaymentError, PaymentReference};
use crate::ports::{
    BillingTransactionRepository, InitializePaymentRequest, PaymentGateway, PlanRepository,
    SubscriptionRepository,
};

#[derive(Debug, Clone)]
pub struct InitializeSubscriptionPaymentCommand {
    pub user_id: UserId,
    pub email: String,
    pub subscription_id: SubscriptionId,
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone)]
pub enum InitializeSubscriptionPaymentResult {
    /// Paid plan: the payer continues at the gateway.
    Checkout {
        authorization_url: String,
        access_code: Option<String>,
        reference: PaymentReference,
    },
    /// Free plan: activated on the spot, no gateway involved.
    Activated { subscription: Subscription },
}

pub struct InitializeSubscriptionPaymentHandler {
    plans: Arc<dyn PlanRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    transactions: Arc<dyn BillingTransactionRepository>,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
    default_callback_url: Option<String>,
}

impl InitializeSubscriptionPaymentHandler {
    pub fn new(
        plans: Arc<dyn PlanRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        transactions: Arc<dyn BillingTransactionRepository>,
        gateway: Arc<dyn PaymentGateway>,
        currency: impl Into<String>,
        default_callback_url: Option<String>,
    ) -> Self {
        Self {
            plans,
            subscriptions,
            transactions,
            gateway,
            currency: currency.into(),
            default_callback_url,
        }
    }

    pub async fn handle(
        &self,
        cmd: InitializeSubscriptionPaymentCommand,
    ) -> Result<InitializeSubscriptionPaymentResult, PaymentError> {
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
        let plan = self
            .plans
            .find_by_id(&subscription.plan_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Plan", subscription.plan_id))?;

        if plan.is_free() {
            subscription.activate(plan.interval, Timestamp::now())?;
            self.subscriptions.update(&subscription).await?;
            tracing::info!(subscription_id = %subscription.id, plan = %plan.name, "Free plan activated");
            return Ok(InitializeSubscriptionPaymentResult::Activated { subscription });
        }

        if cmd.email.trim().is_empty() {
            return Err(PaymentError::validation("email", "payer email is required"));
        }

        let transaction = BillingTransaction::initialize(&subscription, &plan, self.currency.clone())?;
        self.transactions.save(&transaction).await?;

        let session = self
            .gateway
            .initialize(InitializePaymentRequest {
                email: cmd.email.trim().to_string(),
                amount_minor: transaction.amount_minor,
                currency: transaction.currency.clone(),
                reference: transaction.reference.clone(),
                callback_url: cmd.callback_url.or_else(|| self.default_callback_url.clone()),
                metadata: Some(transaction.metadata.clone()),
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    reference = %transaction.reference,
                    subscription_id = %subscription.id,
                    error = %e,
                    "Gateway initialize failed; transaction left initialized"
                );
                e
            })?;

        Ok(InitializeSubscriptionPaymentResult::Checkout {
            authorization_url: session.authorization_url,
            access_code: session.access_code,
            reference: transaction.reference,
        })
    }
}
