//! Order payment attempt repository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::marketplace::OrderTransaction;
use crate::domain::payment::PaymentReference;

#[async_trait]
pub trait OrderTransactionRepository: Send + Sync {
    /// Inserts a new `initialized` transaction.
    ///
    /// # Errors
    ///
    /// - `DuplicateReference` if the reference is already taken
    async fn save(&self, transaction: &OrderTransaction) -> Result<(), DomainError>;

    /// Replaces the metadata of a transaction that is still `initialized`.
    /// A transaction settled in the meantime is left as it is.
    async fn update_metadata(&self, transaction: &OrderTransaction) -> Result<(), DomainError>;

    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<OrderTransaction>, DomainError>;

    /// All attempts for an order, oldest first.
    async fn list_for_order(&self, order_id: &OrderId) -> Result<Vec<OrderTransaction>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn OrderTransactionRepository) {}
}
