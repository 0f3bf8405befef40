//! Plan repository port (read-only; plans are seeded).

use async_trait::async_trait;

use crate::domain::billing::Plan;
use crate::domain::foundation::{DomainError, PlanId};

#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// All plans ordered by user type, then tier.
    async fn list(&self) -> Result<Vec<Plan>, DomainError>;

    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError>;
}
