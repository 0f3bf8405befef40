//! Billing transaction repository port.

use async_trait::async_trait;

use crate::domain::billing::BillingTransaction;
use crate::domain::foundation::DomainError;
use crate::domain::payment::PaymentReference;

#[async_trait]
pub trait BillingTransactionRepository: Send + Sync {
    /// Inserts a new `initialized` transaction.
    ///
    /// # Errors
    ///
    /// - `DuplicateReference` if the reference is already taken
    async fn save(&self, transaction: &BillingTransaction) -> Result<(), DomainError>;

    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<BillingTransaction>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn BillingTransactionRepository) {}
}
