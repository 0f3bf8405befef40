//! HTTP error mapping.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::foundation::DomainError;
use crate::domain::payment::PaymentError;

/// JSON error body shared by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// API error type that converts payment errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub PaymentError);

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(PaymentError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.0.code(), error = %self.0, "Request failed");
        }

        let mut body = ErrorResponse::new(self.0.code(), public_message(&self.0));
        if let PaymentError::ValidationFailed { field, .. } = &self.0 {
            body = body.with_details(serde_json::json!({ "field": field }));
        }
        (status, Json(body)).into_response()
    }
}

/// Infrastructure detail stays in the logs.
fn public_message(err: &PaymentError) -> String {
    match err {
        PaymentError::Infrastructure(_) => "Internal server error".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn signature_failure_is_400() {
        let response = ApiError(PaymentError::SignatureInvalid).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn gateway_outage_is_503() {
        let response = ApiError(PaymentError::gateway_unavailable("timeout")).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn unknown_reference_is_404() {
        let response = ApiError(PaymentError::reference_not_found("ORD_x")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn infrastructure_message_is_hidden() {
        let err = PaymentError::infrastructure("connection refused at 10.0.0.3");
        assert_eq!(public_message(&err), "Internal server error");
    }
}
