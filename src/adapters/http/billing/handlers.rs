//! HTTP handlers for billing endpoints.

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::{
    CancelSubscriptionCommand, CreateSubscriptionCommand, GetCurrentSubscriptionQuery,
    GetSubscriptionQuery, InitializeSubscriptionPaymentCommand, ListPlansQuery, VerifySubscriptionPaymentCommand,
};
use crate::domain::foundation::SubscriptionId;

use super::super::auth::AuthenticatedUser;
use super::super::error::ApiError;
use super::super::orders::dto::VerifyPaymentRequest;
use super::super::state::AppState;
use super::dto::{
    CreateSubscriptionRequest, CurrentSubscriptionResponse, InitializeSubscriptionPaymentRequest,
    ListPlansParams, PlanListResponse, PlanResponse, SubscriptionPaymentResponse,
    SubscriptionPaymentVerifiedResponse, SubscriptionResponse,
};

/// GET /api/billing/plans - Plan catalogue, optionally for one account type
pub async fn list_plans(
    State(state): State<AppState>,
    Query(params): Query<ListPlansParams>,
) -> Result<impl IntoResponse, ApiError> {
    let plans = state
        .list_plans_handler()
        .handle(ListPlansQuery {
            user_type: params.user_type,
        })
        .await?;

    Ok(Json(PlanListResponse {
        plans: plans.into_iter().map(PlanResponse::from).collect(),
    }))
}

/// POST /api/billing/subscriptions - Subscribe to a plan (inactive until paid)
pub async fn create_subscription(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateSubscriptionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .create_subscription_handler()
        .handle(CreateSubscriptionCommand {
            user_id: user.user_id,
            plan_id: request.plan_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse::new(result.subscription, Some(result.plan))),
    ))
}

/// GET /api/billing/subscriptions/current - Most recent active subscription
pub async fn current_subscription(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let current = state
        .current_subscription_handler()
        .handle(GetCurrentSubscriptionQuery {
            user_id: user.user_id,
        })
        .await?;

    Ok(Json(CurrentSubscriptionResponse {
        subscription: current.map(SubscriptionResponse::from),
    }))
}

/// GET /api/billing/subscriptions/:id - One of the caller's subscriptions
pub async fn get_subscription(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(subscription_id): Path<SubscriptionId>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state
        .subscription_handler()
        .handle(GetSubscriptionQuery {
            user_id: user.user_id,
            subscription_id,
        })
        .await?;

    Ok(Json(SubscriptionResponse::from(found)))
}

/// POST /api/billing/subscriptions/:id/cancel - End a subscription now
pub async fn cancel_subscription(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(subscription_id): Path<SubscriptionId>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .cancel_subscription_handler()
        .handle(CancelSubscriptionCommand {
            user_id: user.user_id,
            subscription_id,
        })
        .await?;

    Ok(Json(SubscriptionResponse::new(result.subscription, None)))
}

/// POST /api/billing/pay/initialize - Pay for a subscription
pub async fn initialize_subscription_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<InitializeSubscriptionPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .initialize_subscription_payment_handler()
        .handle(InitializeSubscriptionPaymentCommand {
            user_id: user.user_id,
            email: request.email.or(user.email).unwrap_or_default(),
            subscription_id: request.subscription_id,
            callback_url: request.callback_url,
        })
        .await?;

    Ok(Json(SubscriptionPaymentResponse::from(result)))
}

/// POST /api/billing/pay/verify - Ask the gateway and activate if paid
pub async fn verify_subscription_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .verify_subscription_payment_handler()
        .handle(VerifySubscriptionPaymentCommand {
            user_id: user.user_id,
            reference: request.reference,
        })
        .await?;

    Ok(Json(SubscriptionPaymentVerifiedResponse::from(result)))
}
