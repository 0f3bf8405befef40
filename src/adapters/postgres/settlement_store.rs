//! PostgreSQL settlement store.
//!
//! Each settlement is one database transaction. Row locks are taken in a
//! fixed order (payment transaction, order, crop, wallet) so two settlers
//! of different references never deadlock, and two settlers of the same
//! reference serialize on the first lock.
//!
//! A successful charge whose order is no longer `ACCEPTED` commits only the
//! closed payment transaction; crop and wallet are never locked for it.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::billing_transaction_repository::BILLING_TRANSACTION_COLUMNS;
use super::crop_repository::CROP_COLUMNS;
use super::ledger_reader::WALLET_COLUMNS;
use super::order_repository::ORDER_COLUMNS;
use super::order_transaction_repository::ORDER_TRANSACTION_COLUMNS;
use super::plan_repository::PLAN_COLUMNS;
use super::rows::{
    BillingTransactionRow, CropRow, OrderRow, OrderTransactionRow, PlanRow, SubscriptionRow,
    WalletRow,
};
use super::subscription_repository::SUBSCRIPTION_COLUMNS;
use crate::domain::billing::{self, BillingTransaction, Plan, Subscription, SubscriptionSettlement};
use crate::domain::foundation::{Timestamp, WalletId};
use crate::domain::ledger::{LedgerTransaction, Wallet};
use crate::domain::marketplace::{self, Crop, Order, OrderSettlement, OrderTransaction};
use crate::domain::payment::{
    admit, Admission, PaymentError, PaymentReference, SettlementOutcome, TransactionStatus,
};
use crate::ports::{SettlementRequest, SettlementStore};

const LEDGER_REFERENCE_CONSTRAINT: &str = "ledger_transactions_reference_key";

pub struct PostgresSettlementStore {
    pool: PgPool,
}

impl PostgresSettlementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db(context: &'static str) -> impl FnOnce(sqlx::Error) -> PaymentError {
    move |e| PaymentError::infrastructure(format!("{}: {}", context, e))
}

async fn lock_order_transaction(
    tx: &mut Transaction<'_, Postgres>,
    reference: &PaymentReference,
) -> Result<OrderTransaction, PaymentError> {
    let row: Option<OrderTransactionRow> = sqlx::query_as(&format!(
        "SELECT {} FROM order_transactions WHERE reference = $1 FOR UPDATE",
        ORDER_TRANSACTION_COLUMNS
    ))
    .bind(reference.as_str())
    .fetch_optional(&mut **tx)
    .await
    .map_err(db("Failed to lock order transaction"))?;

    let row = row.ok_or_else(|| PaymentError::reference_not_found(reference.as_str()))?;
    Ok(OrderTransaction::try_from(row)?)
}

async fn write_order_transaction(
    tx: &mut Transaction<'_, Postgres>,
    transaction: &OrderTransaction,
) -> Result<(), PaymentError> {
    sqlx::query(
        r#"
        UPDATE order_transactions
        SET status = $2, gateway_response = $3, verified_at = $4, metadata = $5
        WHERE id = $1
        "#,
    )
    .bind(transaction.id.as_uuid())
    .bind(transaction.status.as_str())
    .bind(&transaction.gateway_response)
    .bind(transaction.verified_at.map(|t| *t.as_datetime()))
    .bind(&transaction.metadata)
    .execute(&mut **tx)
    .await
    .map_err(db("Failed to update order transaction"))?;
    Ok(())
}

async fn lock_order(
    tx: &mut Transaction<'_, Postgres>,
    transaction: &OrderTransaction,
) -> Result<Order, PaymentError> {
    let order_row: Option<OrderRow> = sqlx::query_as(&format!(
        "SELECT {} FROM orders WHERE id = $1 FOR UPDATE",
        ORDER_COLUMNS
    ))
    .bind(transaction.order_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await
    .map_err(db("Failed to lock order"))?;
    Ok(Order::try_from(
        order_row.ok_or_else(|| PaymentError::not_found("Order", transaction.order_id))?,
    )?)
}

async fn lock_crop_and_wallet(
    tx: &mut Transaction<'_, Postgres>,
    order: &Order,
) -> Result<(Crop, Wallet), PaymentError> {
    let crop_row: Option<CropRow> = sqlx::query_as(&format!(
        "SELECT {} FROM crops WHERE id = $1 FOR UPDATE",
        CROP_COLUMNS
    ))
    .bind(order.crop_id.as_uuid())
    .fetch_optional(&mut **tx)
    .await
    .map_err(db("Failed to lock crop"))?;
    let crop = Crop::try_from(crop_row.ok_or_else(|| PaymentError::not_found("Crop", order.crop_id))?)?;

    // Insert-if-absent, then lock whichever row won.
    let now = Timestamp::now();
    sqlx::query(
        r#"
        INSERT INTO wallets (id, farmer_id, balance, created_at, updated_at)
        VALUES ($1, $2, 0, $3, $3)
        ON CONFLICT (farmer_id) DO NOTHING
        "#,
    )
    .bind(WalletId::new().as_uuid())
    .bind(order.farmer_id.as_uuid())
    .bind(now.as_datetime())
    .execute(&mut **tx)
    .await
    .map_err(db("Failed to open wallet"))?;

    let wallet_row: WalletRow = sqlx::query_as(&format!(
        "SELECT {} FROM wallets WHERE farmer_id = $1 FOR UPDATE",
        WALLET_COLUMNS
    ))
    .bind(order.farmer_id.as_uuid())
    .fetch_one(&mut **tx)
    .await
    .map_err(db("Failed to lock wallet"))?;

    Ok((crop, Wallet::try_from(wallet_row)?))
}

/// Returns `false` when another settlement already wrote this reference.
async fn insert_ledger_entry(
    tx: &mut Transaction<'_, Postgres>,
    entry: &LedgerTransaction,
) -> Result<bool, PaymentError> {
    let result = sqlx::query(
        r#"
        INSERT INTO ledger_transactions (
            id, user_id, wallet_id, amount, reference, entry_type,
            status, description, metadata, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(entry.id.as_uuid())
    .bind(entry.user_id.as_uuid())
    .bind(entry.wallet_id.as_uuid())
    .bind(entry.amount.value())
    .bind(entry.reference.as_str())
    .bind(entry.entry_type.as_str())
    .bind(entry.status.as_str())
    .bind(&entry.description)
    .bind(&entry.metadata)
    .bind(entry.created_at.as_datetime())
    .execute(&mut **tx)
    .await;

    match result {
        Ok(_) => Ok(true),
        Err(sqlx::Error::Database(db_err)) if db_err.constraint() == Some(LEDGER_REFERENCE_CONSTRAINT) => {
            Ok(false)
        }
        Err(e) => Err(db("Failed to write ledger entry")(e)),
    }
}

async fn lock_billing_transaction(
    tx: &mut Transaction<'_, Postgres>,
    reference: &PaymentReference,
) -> Result<BillingTransaction, PaymentError> {
    let row: Option<BillingTransactionRow> = sqlx::query_as(&format!(
        "SELECT {} FROM billing_transactions WHERE reference = $1 FOR UPDATE",
        BILLING_TRANSACTION_COLUMNS
    ))
    .bind(reference.as_str())
    .fetch_optional(&mut **tx)
    .await
    .map_err(db("Failed to lock billing transaction"))?;

    let row = row.ok_or_else(|| PaymentError::reference_not_found(reference.as_str()))?;
    Ok(BillingTransaction::try_from(row)?)
}

async fn write_billing_transaction(
    tx: &mut Transaction<'_, Postgres>,
    transaction: &BillingTransaction,
) -> Result<(), PaymentError> {
    sqlx::query(
        "UPDATE billing_transactions SET status = $2, gateway_response = $3, verified_at = $4 WHERE id = $1",
    )
    .bind(transaction.id.as_uuid())
    .bind(transaction.status.as_str())
    .bind(&transaction.gateway_response)
    .bind(transaction.verified_at.map(|t| *t.as_datetime()))
    .execute(&mut **tx)
    .await
    .map_err(db("Failed to update billing transaction"))?;
    Ok(())
}

#[async_trait]
impl SettlementStore for PostgresSettlementStore {
    async fn settle_order_payment(
        &self,
        request: SettlementRequest,
    ) -> Result<SettlementOutcome<OrderSettlement>, PaymentError> {
        let mut tx = self.pool.begin().await.map_err(db("Failed to begin settlement"))?;

        let mut transaction = lock_order_transaction(&mut tx, &request.reference).await?;
        let target = match admit(&request.reference, transaction.status, request.status) {
            Admission::Proceed { target } => target,
            Admission::Pending => return Ok(SettlementOutcome::Pending),
            Admission::AlreadyProcessed { .. } => return Ok(SettlementOutcome::AlreadyProcessed),
        };

        if target == TransactionStatus::Failed {
            transaction.settle(TransactionStatus::Failed, request.gateway_response, request.at)?;
            write_order_transaction(&mut tx, &transaction).await?;
            tx.commit().await.map_err(db("Failed to commit settlement"))?;
            tracing::info!(reference = %request.reference, "Order payment failed at gateway");
            return Ok(SettlementOutcome::Failed);
        }

        let mut order = lock_order(&mut tx, &transaction).await?;
        if !order.is_payable() {
            let anomaly = marketplace::record_unapplied_charge(
                &mut transaction,
                &order,
                request.gateway_response,
                request.at,
            )?;
            write_order_transaction(&mut tx, &transaction).await?;
            tx.commit().await.map_err(db("Failed to commit settlement"))?;
            return Ok(SettlementOutcome::Unapplied(anomaly));
        }

        let (mut crop, mut wallet) = lock_crop_and_wallet(&mut tx, &order).await?;
        let (settlement, entry) = marketplace::settle_order_payment(
            &mut transaction,
            &mut order,
            &mut crop,
            &mut wallet,
            request.gateway_response,
            request.at,
        )?;

        write_order_transaction(&mut tx, &transaction).await?;
        sqlx::query("UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(order.id.as_uuid())
            .bind(order.status.as_str())
            .bind(request.at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(db("Failed to update order"))?;
        sqlx::query("UPDATE crops SET quantity_kg = $2, updated_at = $3 WHERE id = $1")
            .bind(crop.id.as_uuid())
            .bind(crop.quantity_kg)
            .bind(crop.updated_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(db("Failed to update crop stock"))?;
        sqlx::query("UPDATE wallets SET balance = $2, updated_at = $3 WHERE id = $1")
            .bind(wallet.id.as_uuid())
            .bind(wallet.balance.value())
            .bind(wallet.updated_at.as_datetime())
            .execute(&mut *tx)
            .await
            .map_err(db("Failed to credit wallet"))?;

        if !insert_ledger_entry(&mut tx, &entry).await? {
            tx.rollback().await.map_err(db("Failed to roll back settlement"))?;
            tracing::info!(reference = %request.reference, "Ledger already holds reference; rolled back");
            return Ok(SettlementOutcome::AlreadyProcessed);
        }

        tx.commit().await.map_err(db("Failed to commit settlement"))?;
        Ok(SettlementOutcome::Settled(settlement))
    }

    async fn settle_subscription_payment(
        &self,
        request: SettlementRequest,
    ) -> Result<SettlementOutcome<SubscriptionSettlement>, PaymentError> {
        let mut tx = self.pool.begin().await.map_err(db("Failed to begin settlement"))?;

        let mut transaction = lock_billing_transaction(&mut tx, &request.reference).await?;
        let target = match admit(&request.reference, transaction.status, request.status) {
            Admission::Proceed { target } => target,
            Admission::Pending => return Ok(SettlementOutcome::Pending),
            Admission::AlreadyProcessed { .. } => return Ok(SettlementOutcome::AlreadyProcessed),
        };

        if target == TransactionStatus::Failed {
            transaction.settle(TransactionStatus::Failed, request.gateway_response, request.at)?;
            write_billing_transaction(&mut tx, &transaction).await?;
            tx.commit().await.map_err(db("Failed to commit settlement"))?;
            tracing::info!(reference = %request.reference, "Subscription payment failed at gateway");
            return Ok(SettlementOutcome::Failed);
        }

        let subscription_row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE id = $1 FOR UPDATE",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(transaction.subscription_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db("Failed to lock subscription"))?;
        let mut subscription = Subscription::try_from(subscription_row.ok_or_else(|| {
            PaymentError::not_found("Subscription", transaction.subscription_id)
        })?)?;

        let plan_row: Option<PlanRow> = sqlx::query_as(&format!(
            "SELECT {} FROM plans WHERE id = $1",
            PLAN_COLUMNS
        ))
        .bind(subscription.plan_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db("Failed to load plan"))?;
        let plan = Plan::try_from(plan_row.ok_or_else(|| PaymentError::not_found("Plan", subscription.plan_id))?)?;

        let settlement = billing::settle_subscription_payment(
            &mut transaction,
            &mut subscription,
            &plan,
            request.customer,
            request.gateway_response,
            request.at,
        )?;

        write_billing_transaction(&mut tx, &transaction).await?;
        sqlx::query(
            r#"
            UPDATE subscriptions SET
                status = $2, start_date = $3, end_date = $4,
                external_reference = $5, external_customer = $6, updated_at = $7
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
        .execute(&mut *tx)
        .await
        .map_err(db("Failed to activate subscription"))?;

        tx.commit().await.map_err(db("Failed to commit settlement"))?;
        Ok(SettlementOutcome::Settled(settlement))
    }
}
