//! PostgreSQL implementation of OrderTransactionRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::{insert_error, OrderTransactionRow};
use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::marketplace::OrderTransaction;
use crate::domain::payment::PaymentReference;
use crate::ports::OrderTransactionRepository;

pub(super) const ORDER_TRANSACTION_COLUMNS: &str = "id, order_id, reference, amount_minor, currency, \
     status, metadata, gateway_response, created_at, verified_at";

pub struct PostgresOrderTransactionRepository {
    pool: PgPool,
}

impl PostgresOrderTransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderTransactionRepository for PostgresOrderTransactionRepository {
    async fn save(&self, transaction: &OrderTransaction) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO order_transactions (
                id, order_id, reference, amount_minor, currency, status,
                metadata, gateway_response, created_at, verified_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.order_id.as_uuid())
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
        .map_err(|e| insert_error(e, "order_transactions_reference_key", "order transaction"))?;

        Ok(())
    }

    async fn update_metadata(&self, transaction: &OrderTransaction) -> Result<(), DomainError> {
        sqlx::query(
            "UPDATE order_transactions SET metadata = $2 WHERE id = $1 AND status = 'initialized'",
        )
        .bind(transaction.id.as_uuid())
        .bind(&transaction.metadata)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update order transaction: {}", e)))?;

        Ok(())
    }

    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<OrderTransaction>, DomainError> {
        let row: Option<OrderTransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM order_transactions WHERE reference = $1",
            ORDER_TRANSACTION_COLUMNS
        ))
        .bind(reference.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch order transaction: {}", e)))?;

        row.map(OrderTransaction::try_from).transpose()
    }

    async fn list_for_order(&self, order_id: &OrderId) -> Result<Vec<OrderTransaction>, DomainError> {
        let rows: Vec<OrderTransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM order_transactions WHERE order_id = $1 ORDER BY created_at, id",
            ORDER_TRANSACTION_COLUMNS
        ))
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list order transactions: {}", e)))?;

        rows.into_iter().map(OrderTransaction::try_from).collect()
    }
}
