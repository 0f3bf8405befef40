//! PostgreSQL implementation of SubscriptionRepository.
//!
//! Status changes made through settlement go through the settlement store;
//! this repository covers creation, cancellation and lapse sweeps.

use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::SubscriptionRow;
use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::ports::SubscriptionRepository;

pub(super) const SUBSCRIPTION_COLUMNS: &str = "id, user_id, plan_id, status, start_date, end_date, \
     external_reference, external_customer, created_at, updated_at";

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (
                id, user_id, plan_id, status, start_date, end_date,
                external_reference, external_customer, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.user_id.as_uuid())
        .bind(subscription.plan_id.as_uuid())
        .bind(subscription.status.as_str())
        .bind(subscription.start_date.map(|t| *t.as_datetime()))
        .bind(subscription.end_date.map(|t| *t.as_datetime()))
        .bind(&subscription.external_reference)
        .bind(&subscription.external_customer)
        .bind(subscription.created_at.as_datetime())
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save subscription: {}", e)))?;

        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                status = $2,
                start_date = $3,
                end_date = $4,
                external_reference = $5,
                external_customer = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.status.as_str())
        .bind(subscription.start_date.map(|t| *t.as_datetime()))
        .bind(subscription.end_date.map(|t| *t.as_datetime()))
        .bind(&subscription.external_reference)
        .bind(&subscription.external_customer)
        .bind(subscription.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update subscription: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription not found: {}", subscription.id),
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE id = $1",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch subscription: {}", e)))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_current_for_user(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM subscriptions
            WHERE user_id = $1
              AND status = 'active'
              AND (end_date IS NULL OR end_date > $2)
            ORDER BY start_date DESC NULLS LAST, id DESC
            LIMIT 1
            "#,
            SUBSCRIPTION_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .bind(now.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch current subscription: {}", e)))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_lapsed(&self, now: Timestamp) -> Result<Vec<Subscription>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE status = 'active' AND end_date <= $1 ORDER BY end_date",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(now.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch lapsed subscriptions: {}", e)))?;

        rows.into_iter().map(Subscription::try_from).collect()
    }
}
