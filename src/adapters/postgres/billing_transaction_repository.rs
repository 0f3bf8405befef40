//! PostgreSQL implementation of BillingTransactionRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::{insert_error, BillingTransactionRow};
use crate::domain::billing::BillingTransaction;
use crate::domain::foundation::DomainError;
use crate::domain::payment::PaymentReference;
use crate::ports::BillingTransactionRepository;

pub(super) const BILLING_TRANSACTION_COLUMNS: &str = "id, user_id, subscription_id, reference, \
     amount_minor, currency, status, metadata, gateway_response, created_at, verified_at";

pub struct PostgresBillingTransactionRepository {
    pool: PgPool,
}

impl PostgresBillingTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BillingTransactionRepository for PostgresBillingTransactionRepository {
    async fn save(&self, transaction: &BillingTransaction) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO billing_transactions (
                id, user_id, subscription_id, reference, amount_minor, currency,
                status, metadata, gateway_response, created_at, verified_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.user_id.as_uuid())
        .bind(transaction.subscription_id.as_uuid())
        .bind(transaction.reference.as_str())
        .bind(transaction.amount_minor)
        .bind(&transaction.currency)
        .bind(transaction.status.as_str())
        .bind(&transaction.metadata)
        .bind(&transaction.gateway_response)
        .bind(transaction.created_at.as_datetime())
        .bind(transaction.verified_at.map(|t| *t.as_datetime()))
        .execute(&self.pool)
        .await
        .map_err(|e| insert_error(e, "billing_transactions_reference_key", "billing transaction"))?;

        Ok(())
    }

    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<BillingTransaction>, DomainError> {
        let row: Option<BillingTransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM billing_transactions WHERE reference = $1",
            BILLING_TRANSACTION_COLUMNS
        ))
        .bind(reference.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch billing transaction: {}", e)))?;

        row.map(BillingTransaction::try_from).transpose()
    }
}
