//! HTTP DTOs for order endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::handlers::{InitializeOrderPaymentResult, VerifyOrderPaymentResult};
use crate::domain::foundation::{CropId, Money, OrderId, Timestamp, UserId};
use crate::domain::marketplace::{Order, OrderAction, OrderStatus};
use crate::domain::payment::OutcomeKind;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    pub crop_id: CropId,
    pub quantity_kg: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderActionRequest {
    pub action: OrderAction,
}

/// Body of both pay/initialize endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitializePaymentRequest {
    /// Payer email; falls back to the `X-User-Email` header.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub callback_url: Option<String>,
}

/// Body of both pay/verify endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyPaymentRequest {
    pub reference: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub id: OrderId,
    pub buyer_id: UserId,
    pub farmer_id: UserId,
    pub crop_id: CropId,
    pub crop_name: String,
    pub quantity_kg: Decimal,
    pub total_price: Money,
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            buyer_id: order.buyer_id,
            farmer_id: order.farmer_id,
            crop_id: order.crop_id,
            crop_name: order.crop_name,
            quantity_kg: order.quantity_kg,
            total_price: order.total_price,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub authorization_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
    pub reference: String,
}

impl From<InitializeOrderPaymentResult> for CheckoutResponse {
    fn from(result: InitializeOrderPaymentResult) -> Self {
        Self {
            authorization_url: result.authorization_url,
            access_code: result.access_code,
            reference: result.reference.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderPaymentVerifiedResponse {
    pub reference: String,
    pub outcome: OutcomeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
}

impl From<VerifyOrderPaymentResult> for OrderPaymentVerifiedResponse {
    fn from(result: VerifyOrderPaymentResult) -> Self {
        Self {
            reference: result.reference.to_string(),
            outcome: result.outcome,
            order_id: result.settlement.as_ref().map(|s| s.order_id),
            amount: result.settlement.as_ref().map(|s| s.amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_accepts_string_or_number() {
        let crop_id = CropId::new();
        let from_string: PlaceOrderRequest = serde_json::from_str(&format!(
            r#"{{"crop_id":"{}","quantity_kg":"12.5"}}"#,
            crop_id
        ))
        .unwrap();
        let from_number: PlaceOrderRequest = serde_json::from_str(&format!(
            r#"{{"crop_id":"{}","quantity_kg":12.5}}"#,
            crop_id
        ))
        .unwrap();
        assert_eq!(from_string.quantity_kg, from_number.quantity_kg);
    }

    #[test]
    fn action_is_lowercase() {
        let request: OrderActionRequest = serde_json::from_str(r#"{"action":"accept"}"#).unwrap();
        assert_eq!(request.action, OrderAction::Accept);
    }

    #[test]
    fn initialize_body_is_optional() {
        let request: InitializePaymentRequest = serde_json::from_str("{}").unwrap();
        assert!(request.email.is_none());
    }
}
