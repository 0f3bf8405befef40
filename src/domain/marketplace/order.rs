//! Order aggregate.
//!
//! An order is a buyer's request for a quantity of one crop listing. The
//! farmer accepts or declines it; an accepted order can be paid, and a paid
//! order is shipped and completed.
//!
//! # Design Decisions
//!
//! - **Price frozen at placement**: `total_price` is computed once from the
//!   listing price and never recomputed
//! - **Stock checked twice**: placement rejects quantities above current
//!   stock; settlement decrements unconditionally (see [`Crop::deduct_stock`])
//! - **Never deleted**: orders end in a terminal status instead

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{
    CropId, Money, OrderId, StateMachine, Timestamp, UserId, ValidationError,
};
use crate::domain::payment::PaymentError;

use super::{Crop, OrderStatus};

/// Participant-driven order transitions. `Paid` is reserved for settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderAction {
    Accept,
    Decline,
    Ship,
    Complete,
    Cancel,
}

impl OrderAction {
    pub fn target(&self) -> OrderStatus {
        match self {
            OrderAction::Accept => OrderStatus::Accepted,
            OrderAction::Decline => OrderStatus::Declined,
            OrderAction::Ship => OrderStatus::Shipped,
            OrderAction::Complete => OrderStatus::Completed,
            OrderAction::Cancel => OrderStatus::Cancelled,
        }
    }

    /// Only cancellation is open to the buyer.
    pub fn farmer_only(&self) -> bool {
        !matches!(self, OrderAction::Cancel)
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderAction::Accept => "accept",
            OrderAction::Decline => "decline",
            OrderAction::Ship => "ship",
            OrderAction::Complete => "complete",
            OrderAction::Cancel => "cancel",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for OrderAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(OrderAction::Accept),
            "decline" => Ok(OrderAction::Decline),
            "ship" => Ok(OrderAction::Ship),
            "complete" => Ok(OrderAction::Complete),
            "cancel" => Ok(OrderAction::Cancel),
            other => Err(ValidationError::invalid_format(
                "action",
                format!("unknown action '{}'", other),
            )),
        }
    }
}

/// Order aggregate.
///
/// # Invariants
///
/// - `quantity_kg > 0` and at placement `quantity_kg <= crop.quantity_kg`
/// - `total_price == crop.price_per_kg * quantity_kg` at placement
/// - Status transitions follow [`OrderStatus`] edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: UserId,
    pub farmer_id: UserId,
    pub crop_id: CropId,
    /// Listing name at placement, for receipts and ledger descriptions.
    pub crop_name: String,
    pub quantity_kg: Decimal,
    pub total_price: Money,
    pub status: OrderStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Places a new order against a listing.
    ///
    /// # Errors
    ///
    /// - quantity not positive
    /// - quantity above the listing's current stock
    /// - buyer ordering their own listing
    pub fn place(buyer_id: UserId, crop: &Crop, quantity_kg: Decimal) -> Result<Self, ValidationError> {
        if quantity_kg <= Decimal::ZERO {
            return Err(ValidationError::not_positive("quantity", quantity_kg));
        }
        if quantity_kg > crop.quantity_kg {
            return Err(ValidationError::exceeds_available(
                "quantity",
                crop.quantity_kg,
                quantity_kg,
            ));
        }
        if buyer_id == crop.farmer_id {
            return Err(ValidationError::invalid_format(
                "crop_id",
                "farmers cannot order their own listing",
            ));
        }

        let total_price = crop.price_per_kg.checked_times(quantity_kg)?;
        let now = Timestamp::now();
        Ok(Self {
            id: OrderId::new(),
            buyer_id,
            farmer_id: crop.farmer_id,
            crop_id: crop.id,
            crop_name: crop.name.clone(),
            quantity_kg,
            total_price,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_participant(&self, user_id: &UserId) -> bool {
        &self.buyer_id == user_id || &self.farmer_id == user_id
    }

    /// Applies a participant action on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the actor may not perform this action
    /// - `InvalidStateTransition` if the edge is not allowed
    pub fn apply(&mut self, action: OrderAction, actor: &UserId) -> Result<(), PaymentError> {
        let allowed = if action.farmer_only() {
            &self.farmer_id == actor
        } else {
            self.is_participant(actor)
        };
        if !allowed {
            return Err(PaymentError::forbidden(format!(
                "user {} may not {} order {}",
                actor, action, self.id
            )));
        }
        self.transition_to(action.target())
    }

    /// Marks the order paid. Called only from settlement.
    pub fn mark_paid(&mut self) -> Result<(), PaymentError> {
        self.transition_to(OrderStatus::Paid)
    }

    pub fn is_payable(&self) -> bool {
        self.status == OrderStatus::Accepted
    }

    /// Requires the order to be awaiting payment.
    pub fn ensure_payable(&self) -> Result<(), PaymentError> {
        if !self.is_payable() {
            return Err(PaymentError::validation(
                "status",
                format!(
                    "order {} must be ACCEPTED before payment, currently {}",
                    self.id, self.status
                ),
            ));
        }
        Ok(())
    }

    fn transition_to(&mut self, target: OrderStatus) -> Result<(), PaymentError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|e| PaymentError::invalid_transition("order", e))?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}
