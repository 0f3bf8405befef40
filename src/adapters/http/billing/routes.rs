//! Axum router configuration for billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::super::state::AppState;
use super::handlers::{
    cancel_subscription, create_subscription, current_subscription, get_subscription,
    initialize_subscription_payment, list_plans, verify_subscription_payment,
};

/// Billing routes, mounted at `/api/billing`.
///
/// - `GET /plans` - Plan catalogue (public)
/// - `POST /subscriptions` - Create an inactive subscription
/// - `GET /subscriptions/current` - Current subscription
/// - `GET /subscriptions/:id` - One subscription (owner only)
/// - `POST /subscriptions/:id/cancel` - Cancel
/// - `POST /pay/initialize` - Start payment
/// - `POST /pay/verify` - Verify and activate
pub fn billing_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/subscriptions", post(create_subscription))
        .route("/subscriptions/current", get(current_subscription))
        .route("/subscriptions/:id", get(get_subscription))
        .route("/subscriptions/:id/cancel", post(cancel_subscription))
        .route("/pay/initialize", post(initialize_subscription_payment))
        .route("/pay/verify", post(verify_subscription_payment))
}
