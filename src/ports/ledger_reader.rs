//! Ledger read port.
//!
//! Wallet balances and ledger entries are only ever written by
//! [`SettlementStore`](super::SettlementStore). This port is the read side.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::ledger::{LedgerTransaction, Wallet};
use crate::domain::payment::PaymentReference;

#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// The farmer's wallet, if one has been opened.
    async fn find_wallet(&self, farmer_id: &UserId) -> Result<Option<Wallet>, DomainError>;

    /// Entries credited to the user's wallet or paid by the user,
    /// newest first, each entry once.
    async fn history_for_user(&self, user_id: &UserId) -> Result<Vec<LedgerTransaction>, DomainError>;

    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<LedgerTransaction>, DomainError>;
}
