//! PostgreSQL implementation of CropRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::CropRow;
use crate::domain::foundation::{CropId, DomainError};
use crate::domain::marketplace::Crop;
use crate::ports::CropRepository;

pub(super) const CROP_COLUMNS: &str = "id, farmer_id, name, price_per_kg, quantity_kg, updated_at";

/// Crop listings are managed by the catalogue service; stock is written
/// here only by settlement.
pub struct PostgresCropRepository {
    pool: PgPool,
}

impl PostgresCropRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CropRepository for PostgresCropRepository {
    async fn find_by_id(&self, id: &CropId) -> Result<Option<Crop>, DomainError> {
        let row: Option<CropRow> = sqlx::query_as(&format!(
            "SELECT {} FROM crops WHERE id = $1",
            CROP_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch crop: {}", e)))?;

        row.map(Crop::try_from).transpose()
    }
}
