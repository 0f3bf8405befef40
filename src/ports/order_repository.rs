//! Order repository port.
//!
//! Participant actions (accept, decline, ship, complete, cancel) are saved
//! through `update`. The move to `PAID` is never written here; only
//! [`SettlementStore`](super::SettlementStore) does that.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId, UserId};
use crate::domain::marketplace::{Order, OrderStatus};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn save(&self, order: &Order) -> Result<(), DomainError>;

    /// Persists a participant status change.
    ///
    /// Implementations only write if the stored status still equals
    /// `expected_status`, so a concurrent settlement is never overwritten.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order doesn't exist
    /// - `InvalidStateTransition` if the stored status moved meanwhile
    async fn update_status(
        &self,
        order: &Order,
        expected_status: OrderStatus,
    ) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Orders where the user is buyer or farmer, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, DomainError>;
}
