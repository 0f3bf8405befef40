//! Crop listing lookup port.
//!
//! Listings belong to the catalogue; the payment path reads them at order
//! placement and decrements stock only inside settlement.

use async_trait::async_trait;

use crate::domain::foundation::{CropId, DomainError};
use crate::domain::marketplace::Crop;

#[async_trait]
pub trait CropRepository: Send + Sync {
    async fn find_by_id(&self, id: &CropId) -> Result<Option<Crop>, DomainError>;
}
