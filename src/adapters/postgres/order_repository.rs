//! PostgreSQL implementation of OrderRepository.

use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::{parse_column, OrderRow};
use crate::domain::foundation::{DomainError, ErrorCode, OrderId, UserId};
use crate::domain::marketplace::{Order, OrderStatus};
use crate::ports::OrderRepository;

pub(super) const ORDER_COLUMNS: &str = "id, buyer_id, farmer_id, crop_id, crop_name, quantity_kg, \
     total_price, status, created_at, updated_at";

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn save(&self, order: &Order) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, buyer_id, farmer_id, crop_id, crop_name, quantity_kg,
                total_price, status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.buyer_id.as_uuid())
        .bind(order.farmer_id.as_uuid())
        .bind(order.crop_id.as_uuid())
        .bind(&order.crop_name)
        .bind(order.quantity_kg)
        .bind(order.total_price.value())
        .bind(order.status.as_str())
        .bind(order.created_at.as_datetime())
        .bind(order.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to save order: {}", e)))?;

        Ok(())
    }

    async fn update_status(&self, order: &Order, expected_status: OrderStatus) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 AND status = $4",
        )
        .bind(order.id.as_uuid())
        .bind(order.status.as_str())
        .bind(order.updated_at.as_datetime())
        .bind(expected_status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to update order: {}", e)))?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        let stored: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
            .bind(order.id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to fetch order: {}", e)))?;

        match stored {
            None => Err(DomainError::new(
                ErrorCode::OrderNotFound,
                format!("Order not found: {}", order.id),
            )),
            Some(raw) => {
                let current: OrderStatus = parse_column("order status", &raw)?;
                Err(DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    format!(
                        "Order {} changed from {} to {} concurrently",
                        order.id, expected_status, current
                    ),
                )
                .with_detail("from", current.as_str())
                .with_detail("to", order.status.as_str()))
            }
        }
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch order: {}", e)))?;

        row.map(Order::try_from).transpose()
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, DomainError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE buyer_id = $1 OR farmer_id = $1 ORDER BY created_at DESC, id",
            ORDER_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list orders: {}", e)))?;

        rows.into_iter().map(Order::try_from).collect()
    }
}
