//! Gateway webhook endpoint.
//!
//! `POST /api/webhooks/paystack` carries no user identity; the signature
//! header over the raw body is the only authentication. Every settlement
//! outcome, duplicates included, is acknowledged with 200 so the gateway
//! stops redelivering. Errors map through [`ApiError`].

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{routing::post, Json, Router};
use serde::Serialize;

use crate::application::handlers::{HandleGatewayWebhookCommand, HandleGatewayWebhookResult};
use crate::domain::payment::{OutcomeKind, ReferenceKind, SIGNATURE_HEADER};

use super::error::ApiError;
use super::state::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WebhookAck {
    Processed {
        reference: String,
        kind: ReferenceKind,
        outcome: OutcomeKind,
    },
    Ignored {
        event: String,
    },
}

impl From<HandleGatewayWebhookResult> for WebhookAck {
    fn from(result: HandleGatewayWebhookResult) -> Self {
        match result {
            HandleGatewayWebhookResult::Processed {
                reference,
                kind,
                outcome,
            } => WebhookAck::Processed {
                reference: reference.to_string(),
                kind,
                outcome,
            },
            HandleGatewayWebhookResult::Ignored { event } => WebhookAck::Ignored { event },
        }
    }
}

/// POST /api/webhooks/paystack
pub async fn handle_paystack_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let result = state
        .webhook_handler()
        .handle(HandleGatewayWebhookCommand {
            payload: body.to_vec(),
            signature,
        })
        .await?;

    Ok(Json(WebhookAck::from(result)))
}

/// Webhook routes, mounted at `/api/webhooks`.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route("/paystack", post(handle_paystack_webhook))
}
