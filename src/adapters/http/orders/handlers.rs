//! HTTP handlers for order endpoints.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::{
    InitializeOrderPaymentCommand, ListOrdersQuery, OrderActionCommand, PlaceOrderCommand,
    VerifyOrderPaymentCommand,
};
use crate::domain::foundation::OrderId;

use super::super::auth::AuthenticatedUser;
use super::super::error::ApiError;
use super::super::state::AppState;
use super::dto::{
    CheckoutResponse, InitializePaymentRequest, OrderActionRequest, OrderListResponse,
    OrderPaymentVerifiedResponse, OrderResponse, PlaceOrderRequest, VerifyPaymentRequest,
};

/// POST /api/orders - Place an order against a crop listing
pub async fn place_order(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .place_order_handler()
        .handle(PlaceOrderCommand {
            buyer_id: user.user_id,
            crop_id: request.crop_id,
            quantity_kg: request.quantity_kg,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(result.order))))
}

/// GET /api/orders - Orders the caller bought or sold
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .list_orders_handler()
        .handle(ListOrdersQuery {
            user_id: user.user_id,
        })
        .await?;

    Ok(Json(OrderListResponse {
        orders: orders.into_iter().map(OrderResponse::from).collect(),
    }))
}

/// POST /api/orders/:id/action - Accept, decline, ship, complete or cancel
pub async fn order_action(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<OrderId>,
    Json(request): Json<OrderActionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .order_action_handler()
        .handle(OrderActionCommand {
            actor_id: user.user_id,
            order_id,
            action: request.action,
        })
        .await?;

    Ok(Json(OrderResponse::from(result.order)))
}

/// POST /api/orders/:id/pay/initialize - Open a gateway checkout for an accepted order
pub async fn initialize_order_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(order_id): Path<OrderId>,
    body: Option<Json<InitializePaymentRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let result = state
        .initialize_order_payment_handler()
        .handle(InitializeOrderPaymentCommand {
            buyer_id: user.user_id,
            buyer_email: request.email.or(user.email).unwrap_or_default(),
            order_id,
            callback_url: request.callback_url,
        })
        .await?;

    Ok(Json(CheckoutResponse::from(result)))
}

/// POST /api/orders/pay/verify - Ask the gateway and settle if paid
pub async fn verify_order_payment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .verify_order_payment_handler()
        .handle(VerifyOrderPaymentCommand {
            user_id: user.user_id,
            reference: request.reference,
        })
        .await?;

    Ok(Json(OrderPaymentVerifiedResponse::from(result)))
}
