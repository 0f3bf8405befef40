//! Axum router configuration for order endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::super::state::AppState;
use super::handlers::{
    initialize_order_payment, list_orders, order_action, place_order, verify_order_payment,
};

/// Order routes, mounted at `/api/orders`.
///
/// - `POST /` - Place an order
/// - `GET /` - List the caller's orders
/// - `POST /:id/action` - Participant action
/// - `POST /:id/pay/initialize` - Start payment
/// - `POST /pay/verify` - Verify and settle a payment
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(place_order).get(list_orders))
        .route("/:id/action", post(order_action))
        .route("/:id/pay/initialize", post(initialize_order_payment))
        .route("/pay/verify", post(verify_order_payment))
}
