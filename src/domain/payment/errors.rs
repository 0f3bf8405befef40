//! Payment reconciliation error types.
//!
//! Every failure the settlement path can produce, with HTTP status mapping
//! and retryability semantics. A duplicate settlement is not an error; it is
//! reported as [`SettlementOutcome::AlreadyProcessed`](super::SettlementOutcome).
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | SignatureInvalid | 400 |
//! | PayloadMalformed | 400 |
//! | ValidationFailed | 400 |
//! | VerificationFailed | 400 |
//! | Forbidden | 403 |
//! | ReferenceNotFound | 404 |
//! | NotFound | 404 |
//! | InvalidStateTransition | 409 |
//! | InsufficientInventory | 409 |
//! | OrderNotPayable | 409 |
//! | GatewayUnavailable | 503 |
//! | Infrastructure | 500 |

use axum::http::StatusCode;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::foundation::{CropId, DomainError, ErrorCode, InvalidTransition, ValidationError};

/// Errors that occur while initializing, verifying or settling payments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    /// Webhook signature missing, malformed or not matching the body.
    #[error("Invalid webhook signature")]
    SignatureInvalid,

    /// Signature was valid but the body is not a well-formed event.
    #[error("Malformed payload: {0}")]
    PayloadMalformed(String),

    /// No payment transaction carries this reference.
    #[error("Unknown payment reference: {0}")]
    ReferenceNotFound(String),

    /// Gateway unreachable, timed out, or answered with an error.
    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// Stock was short when a paid order was settled.
    #[error("Insufficient inventory for crop {crop_id}: available {available}, requested {requested}")]
    InsufficientInventory {
        crop_id: CropId,
        available: Decimal,
        requested: Decimal,
    },

    /// A charge arrived for an order that can no longer take payment.
    #[error("Order {order_id} is not payable (status: {status})")]
    OrderNotPayable { order_id: String, status: String },

    /// Lifecycle edge not allowed from the current state.
    #[error("Invalid {entity} state transition: {from} -> {to}")]
    InvalidStateTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    /// The gateway did not confirm the payment.
    #[error("Payment {reference} not verified (gateway status: {status})")]
    VerificationFailed { reference: String, status: String },

    /// Request-level validation failed.
    #[error("Validation failed on '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The caller may not act on this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Storage or other infrastructure failure.
    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl PaymentError {
    pub fn payload_malformed(reason: impl Into<String>) -> Self {
        PaymentError::PayloadMalformed(reason.into())
    }

    pub fn reference_not_found(reference: impl Into<String>) -> Self {
        PaymentError::ReferenceNotFound(reference.into())
    }

    pub fn gateway_unavailable(reason: impl Into<String>) -> Self {
        PaymentError::GatewayUnavailable(reason.into())
    }

    pub fn invalid_transition(entity: &'static str, err: InvalidTransition) -> Self {
        PaymentError::InvalidStateTransition {
            entity,
            from: err.from,
            to: err.to,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PaymentError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        PaymentError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        PaymentError::Forbidden(reason.into())
    }

    pub fn infrastructure(reason: impl Into<String>) -> Self {
        PaymentError::Infrastructure(reason.into())
    }

    /// Machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::SignatureInvalid => "SIGNATURE_INVALID",
            PaymentError::PayloadMalformed(_) => "PAYLOAD_MALFORMED",
            PaymentError::ReferenceNotFound(_) => "REFERENCE_NOT_FOUND",
            PaymentError::GatewayUnavailable(_) => "GATEWAY_UNAVAILABLE",
            PaymentError::InsufficientInventory { .. } => "INSUFFICIENT_INVENTORY",
            PaymentError::InvalidStateTransition { .. } => "INVALID_STATE_TRANSITION",
            PaymentError::OrderNotPayable { .. } => "ORDER_NOT_PAYABLE",
            PaymentError::VerificationFailed { .. } => "VERIFICATION_FAILED",
            PaymentError::ValidationFailed { .. } => "VALIDATION_FAILED",
            PaymentError::NotFound { .. } => "NOT_FOUND",
            PaymentError::Forbidden(_) => "FORBIDDEN",
            PaymentError::Infrastructure(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true if the caller may retry the same request later.
    ///
    /// A gateway outage leaves the transaction `initialized`, so a retried
    /// verify or webhook delivery can still settle it.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::GatewayUnavailable(_) | PaymentError::Infrastructure(_)
        )
    }

    /// Maps the error to an HTTP status code.
    ///
    /// Webhook senders retry on 5xx only; 4xx tells them to stop.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::SignatureInvalid
            | PaymentError::PayloadMalformed(_)
            | PaymentError::ValidationFailed { .. }
            | PaymentError::VerificationFailed { .. } => StatusCode::BAD_REQUEST,

            PaymentError::Forbidden(_) => StatusCode::FORBIDDEN,

            PaymentError::ReferenceNotFound(_) | PaymentError::NotFound { .. } => {
                StatusCode::NOT_FOUND
            }

            PaymentError::InvalidStateTransition { .. }
            | PaymentError::InsufficientInventory { .. }
            | PaymentError::OrderNotPayable { .. } => StatusCode::CONFLICT,

            PaymentError::GatewayUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,

            PaymentError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationError> for PaymentError {
    fn from(err: ValidationError) -> Self {
        PaymentError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<DomainError> for PaymentError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed | ErrorCode::InvalidFormat => PaymentError::ValidationFailed {
                field: err.details.get("field").cloned().unwrap_or_default(),
                message: err.message,
            },
            ErrorCode::PlanNotFound => PaymentError::NotFound { entity: "Plan", id: err.message },
            ErrorCode::SubscriptionNotFound => PaymentError::NotFound {
                entity: "Subscription",
                id: err.message,
            },
            ErrorCode::OrderNotFound => PaymentError::NotFound { entity: "Order", id: err.message },
            ErrorCode::CropNotFound => PaymentError::NotFound { entity: "Crop", id: err.message },
            ErrorCode::TransactionNotFound => PaymentError::ReferenceNotFound(err.message),
            ErrorCode::Forbidden => PaymentError::Forbidden(err.message),
            ErrorCode::InvalidStateTransition => PaymentError::InvalidStateTransition {
                entity: "record",
                from: err.details.get("from").cloned().unwrap_or_default(),
                to: err.details.get("to").cloned().unwrap_or_default(),
            },
            _ => PaymentError::Infrastructure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Status Mapping
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn signature_and_payload_errors_are_bad_requests() {
        assert_eq!(PaymentError::SignatureInvalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            PaymentError::payload_malformed("eof").status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unknown_reference_is_not_found() {
        assert_eq!(
            PaymentError::reference_not_found("ORD_x").status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn gateway_outage_is_retryable_service_unavailable() {
        let err = PaymentError::gateway_unavailable("timeout");
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.is_retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!PaymentError::SignatureInvalid.is_retryable());
        assert!(!PaymentError::validation("quantity", "too large").is_retryable());
    }

    // ══════════════════════════════════════════════════════════════
    // Conversions
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invalid_transition_keeps_both_states() {
        let err = PaymentError::invalid_transition(
            "order",
            InvalidTransition {
                from: "Pending".into(),
                to: "Paid".into(),
            },
        );
        assert_eq!(err.to_string(), "Invalid order state transition: Pending -> Paid");
        assert_eq!(err.code(), "INVALID_STATE_TRANSITION");
    }

    #[test]
    fn order_not_payable_is_a_conflict() {
        let err = PaymentError::OrderNotPayable {
            order_id: "o-1".into(),
            status: "CANCELLED".into(),
        };
        assert_eq!(err.code(), "ORDER_NOT_PAYABLE");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(!err.is_retryable());
    }

    #[test]
    fn domain_not_found_maps_to_not_found() {
        let err: PaymentError = DomainError::new(ErrorCode::OrderNotFound, "abc").into();
        assert_eq!(err, PaymentError::not_found("Order", "abc"));
    }

    #[test]
    fn domain_database_error_maps_to_infrastructure() {
        let err: PaymentError = DomainError::database("connection reset").into();
        assert!(matches!(err, PaymentError::Infrastructure(_)));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn validation_error_keeps_field() {
        let err: PaymentError = ValidationError::empty_field("email").into();
        assert!(matches!(err, PaymentError::ValidationFailed { ref field, .. } if field == "email"));
    }
}
