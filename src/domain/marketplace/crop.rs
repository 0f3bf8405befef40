//! Crop listing as seen by the payment path.
//!
//! Listings are managed by the catalogue; settlement only reads the price
//! and decrements stock.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CropId, Money, Timestamp, UserId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub id: CropId,
    pub farmer_id: UserId,
    pub name: String,
    pub price_per_kg: Money,
    pub quantity_kg: Decimal,
    pub updated_at: Timestamp,
}

/// Stock left after a settlement decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDeduction {
    pub remaining: Decimal,
    /// How far the decrement went below zero, if it did.
    pub shortfall: Option<Decimal>,
}

impl Crop {
    pub fn new(farmer_id: UserId, name: impl Into<String>, price_per_kg: Money, quantity_kg: Decimal) -> Self {
        Self {
            id: CropId::new(),
            farmer_id,
            name: name.into(),
            price_per_kg,
            quantity_kg,
            updated_at: Timestamp::now(),
        }
    }

    /// Removes sold stock. Always applies, even below zero: the buyer has
    /// already been charged by the time this runs.
    pub fn deduct_stock(&mut self, quantity: Decimal, at: Timestamp) -> StockDeduction {
        let shortfall = if quantity > self.quantity_kg {
            Some(quantity - self.quantity_kg.max(Decimal::ZERO))
        } else {
            None
        };
        self.quantity_kg -= quantity;
        self.updated_at = at;
        StockDeduction {
            remaining: self.quantity_kg,
            shortfall,
        }
    }

    pub fn is_out_of_stock(&self) -> bool {
        self.quantity_kg <= Decimal::ZERO
    }
}
