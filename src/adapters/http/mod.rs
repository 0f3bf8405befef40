//! HTTP adapter - REST API over the application handlers.
//!
//! Each area has its own router; [`api_router`] nests them under `/api`:
//!
//! - `/api/orders` - placing, acting on and paying for orders
//! - `/api/billing` - plans, subscriptions and subscription payments
//! - `/api/wallet` - farmer wallet and ledger history
//! - `/api/webhooks` - gateway callbacks (signature-authenticated)

pub mod auth;
pub mod billing;
pub mod error;
pub mod orders;
pub mod state;
pub mod wallet;
pub mod webhooks;

use axum::Router;

pub use auth::AuthenticatedUser;
pub use billing::billing_routes;
pub use error::{ApiError, ErrorResponse};
pub use orders::order_routes;
pub use state::AppState;
pub use wallet::wallet_routes;
pub use webhooks::webhook_routes;

/// Full API router with state applied. Middleware layers are added by the
/// binary.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/orders", order_routes())
        .nest("/api/billing", billing_routes())
        .nest("/api/wallet", wallet_routes())
        .nest("/api/webhooks", webhook_routes())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::adapters::memory::InMemoryMarketplaceStore;
    use crate::adapters::notify::RecordingNotifier;
    use crate::adapters::paystack::MockPaymentGateway;
    use crate::config::PaymentConfig;
    use crate::domain::foundation::UserId;
    use crate::domain::payment::{sign_payload, SIGNATURE_HEADER};

    const SECRET: &str = "sk_test_router";

    fn app() -> Router {
        let state = AppState::with_store(
            InMemoryMarketplaceStore::with_catalogue(),
            Arc::new(MockPaymentGateway::new()),
            Arc::new(RecordingNotifier::new()),
            &PaymentConfig::new(SECRET),
        );
        api_router(state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn plans_are_public() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/billing/plans?user_type=farmer")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["plans"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn order_endpoints_require_identity() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/orders")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn subscription_detail_is_owner_only() {
        let app = app();
        let owner = UserId::new();
        let plans = body_json(
            app.clone()
                .oneshot(
                    Request::builder()
                        .uri("/api/billing/plans?user_type=farmer")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap(),
        )
        .await;
        let plan_id = plans["plans"][1]["id"].as_str().unwrap().to_string();

        let created = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/billing/subscriptions")
                    .header(auth::USER_ID_HEADER, owner.to_string())
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::json!({ "plan_id": plan_id }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let id = body_json(created).await["id"].as_str().unwrap().to_string();

        let get = |user: UserId| {
            Request::builder()
                .uri(format!("/api/billing/subscriptions/{}", id))
                .header(auth::USER_ID_HEADER, user.to_string())
                .body(Body::empty())
                .unwrap()
        };

        let own = app.clone().oneshot(get(owner)).await.unwrap();
        assert_eq!(own.status(), StatusCode::OK);
        let json = body_json(own).await;
        assert_eq!(json["id"], id.as_str());
        assert_eq!(json["is_active"], false);

        let other = app.clone().oneshot(get(UserId::new())).await.unwrap();
        assert_eq!(other.status(), StatusCode::FORBIDDEN);

        let current = app
            .oneshot(
                Request::builder()
                    .uri("/api/billing/subscriptions/current")
                    .header(auth::USER_ID_HEADER, owner.to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(current.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn wallet_without_sales_is_zero() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/wallet")
                    .header(auth::USER_ID_HEADER, UserId::new().to_string())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["wallet_id"].is_null());
    }

    #[tokio::test]
    async fn unsigned_webhook_is_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/webhooks/paystack")
                    .body(Body::from(r#"{"event":"charge.success","data":{"reference":"ORD_x"}}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn signed_irrelevant_event_is_acknowledged() {
        let body = r#"{"event":"transfer.success","data":{"reference":"TRF_1"}}"#;
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/webhooks/paystack")
                    .header(SIGNATURE_HEADER, sign_payload(SECRET, body.as_bytes()))
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ignored");
        assert_eq!(json["event"], "transfer.success");
    }
}
