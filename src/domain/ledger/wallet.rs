//! Wallet aggregate - a farmer's running balance.
//!
//! # Invariants
//!
//! - Exactly one wallet per farmer (unique on `farmer_id` in storage)
//! - `balance` is never negative
//! - Within this crate the balance only grows, and only through
//!   [`Wallet::credit`] during a settlement

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Amount, Money, Timestamp, UserId, WalletId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub farmer_id: UserId,
    pub balance: Money,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Wallet {
    /// Opens an empty wallet for a farmer.
    pub fn open(farmer_id: UserId) -> Self {
        let now = Timestamp::now();
        Self {
            id: WalletId::new(),
            farmer_id,
            balance: Money::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds a settled payment to the balance.
    pub fn credit(&mut self, amount: Amount, at: Timestamp) {
        self.balance += Money::from(amount);
        self.updated_at = at;
    }
}
