//! Notifier port - best-effort messages to marketplace participants.
//!
//! Delivery happens outside any settlement transaction. A failed
//! notification is logged by the caller and never undoes a state change.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::foundation::{OrderId, SubscriptionId, UserId};
use crate::domain::payment::PaymentError;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    /// To the farmer: a buyer placed an order.
    OrderPlaced { farmer_id: UserId, order_id: OrderId, crop_name: String },
    /// To the buyer.
    OrderAccepted { buyer_id: UserId, order_id: OrderId },
    /// To the buyer.
    OrderDeclined { buyer_id: UserId, order_id: OrderId },
    /// To the farmer: their wallet was credited.
    PaymentReceived { farmer_id: UserId, order_id: OrderId, amount: String },
    /// To the buyer: their payment went through.
    PaymentConfirmed { buyer_id: UserId, order_id: OrderId, amount: String },
    /// To the farmer: a listing ran out after a sale.
    OutOfStock { farmer_id: UserId, crop_name: String },
    SubscriptionActivated { user_id: UserId, subscription_id: SubscriptionId, plan_name: String },
}

impl Notification {
    pub fn recipient(&self) -> UserId {
        match self {
            Notification::OrderPlaced { farmer_id, .. }
            | Notification::PaymentReceived { farmer_id, .. }
            | Notification::OutOfStock { farmer_id, .. } => *farmer_id,
            Notification::OrderAccepted { buyer_id, .. }
            | Notification::OrderDeclined { buyer_id, .. }
            | Notification::PaymentConfirmed { buyer_id, .. } => *buyer_id,
            Notification::SubscriptionActivated { user_id, .. } => *user_id,
        }
    }

    pub fn subject(&self) -> String {
        match self {
            Notification::OrderPlaced { crop_name, .. } => format!("New order for {}", crop_name),
            Notification::OrderAccepted { order_id, .. } => format!("Order #{} accepted", order_id),
            Notification::OrderDeclined { order_id, .. } => format!("Order #{} declined", order_id),
            Notification::PaymentReceived { order_id, amount, .. } => {
                format!("Payment of {} received for order #{}", amount, order_id)
            }
            Notification::PaymentConfirmed { order_id, .. } => {
                format!("Payment confirmed for order #{}", order_id)
            }
            Notification::OutOfStock { crop_name, .. } => format!("{} is out of stock", crop_name),
            Notification::SubscriptionActivated { plan_name, .. } => {
                format!("{} subscription active", plan_name)
            }
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// # Errors
    ///
    /// `Infrastructure` if the message could not be handed off.
    async fn notify(&self, notification: Notification) -> Result<(), PaymentError>;
}
