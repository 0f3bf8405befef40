//! Subscription repository port.
//!
//! Settlement writes to subscriptions go through
//! [`SettlementStore`](super::SettlementStore); this port covers creation,
//! cancellation and reads.

use async_trait::async_trait;

use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, SubscriptionId, Timestamp, UserId};

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the subscription doesn't exist
    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError>;

    /// The user's most recent subscription that is active at `now`.
    ///
    /// Ordered by `start_date` descending, ties broken by id, so the answer
    /// is unambiguous even with several active rows.
    async fn find_current_for_user(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Active subscriptions whose `end_date` is at or before `now`.
    async fn find_lapsed(&self, now: Timestamp) -> Result<Vec<Subscription>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn SubscriptionRepository) {}
}
