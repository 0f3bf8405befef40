//! PostgreSQL implementation of LedgerReader.

use async_trait::async_trait;
use sqlx::PgPool;

use super::rows::{LedgerTransactionRow, WalletRow};
use crate::domain::foundation::{DomainError, UserId};
use crate::domain::ledger::{LedgerTransaction, Wallet};
use crate::domain::payment::PaymentReference;
use crate::ports::LedgerReader;

pub(super) const WALLET_COLUMNS: &str = "id, farmer_id, balance, created_at, updated_at";

const LEDGER_COLUMNS: &str = "l.id, l.user_id, l.wallet_id, l.amount, l.reference, l.entry_type, \
     l.status, l.description, l.metadata, l.created_at";

pub struct PostgresLedgerReader {
    pool: PgPool,
}

impl PostgresLedgerReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerReader for PostgresLedgerReader {
    async fn find_wallet(&self, farmer_id: &UserId) -> Result<Option<Wallet>, DomainError> {
        let row: Option<WalletRow> = sqlx::query_as(&format!(
            "SELECT {} FROM wallets WHERE farmer_id = $1",
            WALLET_COLUMNS
        ))
        .bind(farmer_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch wallet: {}", e)))?;

        row.map(Wallet::try_from).transpose()
    }

    async fn history_for_user(&self, user_id: &UserId) -> Result<Vec<LedgerTransaction>, DomainError> {
        // One row per entry even when the user both paid and owns the wallet.
        let rows: Vec<LedgerTransactionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM ledger_transactions l
            LEFT JOIN wallets w ON w.id = l.wallet_id
            WHERE l.user_id = $1 OR w.farmer_id = $1
            ORDER BY l.created_at DESC, l.id
            "#,
            LEDGER_COLUMNS
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to list ledger history: {}", e)))?;

        rows.into_iter().map(LedgerTransaction::try_from).collect()
    }

    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<LedgerTransaction>, DomainError> {
        let row: Option<LedgerTransactionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM ledger_transactions l WHERE l.reference = $1",
            LEDGER_COLUMNS
        ))
        .bind(reference.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch ledger entry: {}", e)))?;

        row.map(LedgerTransaction::try_from).transpose()
    }
}
