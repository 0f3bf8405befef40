//! PostgreSQL implementation of PlanRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::PlanRow;
use crate::domain::billing::Plan;
use crate::domain::foundation::{DomainError, PlanId};
use crate::ports::PlanRepository;

pub(super) const PLAN_COLUMNS: &str =
    "id, name, tier, user_type, price_minor, billing_interval, description, created_at";

/// Plans are seeded by migration and read-only here.
pub struct PostgresPlanRepository {
    pool: PgPool,
}

impl PostgresPlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanRepository for PostgresPlanRepository {
    async fn list(&self) -> Result<Vec<Plan>, DomainError> {
        let rows: Vec<PlanRow> = sqlx::query_as(&format!(
            "SELECT {} FROM plans ORDER BY user_type, tier",
            PLAN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list plans: {}", e)))?;

        rows.into_iter().map(Plan::try_from).collect()
    }

    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError> {
        let row: Option<PlanRow> = sqlx::query_as(&format!(
            "SELECT {} FROM plans WHERE id = $1",
            PLAN_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch plan: {}", e)))?;

        row.map(Plan::try_from).transpose()
    }
}
