//! HTTP DTOs for billing endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{
    CurrentSubscription, InitializeSubscriptionPaymentResult, VerifySubscriptionPaymentResult,
};
use crate::domain::billing::{Plan, PlanInterval, Subscription, SubscriptionStatus, UserType};
use crate::domain::foundation::{PlanId, SubscriptionId, Timestamp};
use crate::domain::payment::OutcomeKind;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPlansParams {
    #[serde(default)]
    pub user_type: Option<UserType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub plan_id: PlanId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InitializeSubscriptionPaymentRequest {
    pub subscription_id: SubscriptionId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub callback_url: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    pub id: PlanId,
    pub name: String,
    pub tier: i16,
    pub user_type: UserType,
    /// Price in minor currency units.
    pub price: i64,
    pub interval: PlanInterval,
    pub description: String,
}

impl From<Plan> for PlanResponse {
    fn from(plan: Plan) -> Self {
        Self {
            id: plan.id,
            name: plan.name,
            tier: plan.tier,
            user_type: plan.user_type,
            price: plan.price_minor,
            interval: plan.interval,
            description: plan.description,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanListResponse {
    pub plans: Vec<PlanResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub id: SubscriptionId,
    pub plan_id: PlanId,
    pub status: SubscriptionStatus,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanResponse>,
}

impl SubscriptionResponse {
    pub fn new(subscription: Subscription, plan: Option<Plan>) -> Self {
        Self {
            is_active: subscription.is_active(),
            id: subscription.id,
            plan_id: subscription.plan_id,
            status: subscription.status,
            start_date: subscription.start_date,
            end_date: subscription.end_date,
            plan: plan.map(PlanResponse::from),
        }
    }
}

impl From<CurrentSubscription> for SubscriptionResponse {
    fn from(current: CurrentSubscription) -> Self {
        Self::new(current.subscription, current.plan)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentSubscriptionResponse {
    /// Null when the caller has no active subscription.
    pub subscription: Option<SubscriptionResponse>,
}

/// Either a checkout to follow or an immediately activated free plan.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SubscriptionPaymentResponse {
    Checkout {
        authorization_url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        access_code: Option<String>,
        reference: String,
    },
    Activated {
        subscription: SubscriptionResponse,
    },
}

impl From<InitializeSubscriptionPaymentResult> for SubscriptionPaymentResponse {
    fn from(result: InitializeSubscriptionPaymentResult) -> Self {
        match result {
            InitializeSubscriptionPaymentResult::Checkout {
                authorization_url,
                access_code,
                reference,
            } => Self::Checkout {
                authorization_url,
                access_code,
                reference: reference.to_string(),
            },
            InitializeSubscriptionPaymentResult::Activated { subscription } => Self::Activated {
                subscription: SubscriptionResponse::new(subscription, None),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionPaymentVerifiedResponse {
    pub reference: String,
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<SubscriptionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Timestamp>,
}

impl From<VerifySubscriptionPaymentResult> for SubscriptionPaymentVerifiedResponse {
    fn from(result: VerifySubscriptionPaymentResult) -> Self {
        Self {
            reference: result.reference.to_string(),
            outcome: result.outcome,
            subscription_id: result.settlement.as_ref().map(|s| s.subscription_id),
            end_date: result.settlement.as_ref().and_then(|s| s.end_date),
        }
    }
}
