//! HTTP adapter for wallet and ledger history endpoints.
//!
//! - `GET /api/wallet` - The caller's wallet as a farmer
//! - `GET /api/wallet/transactions` - Ledger entries the caller paid or received

use axum::extract::{Json, State};
use axum::response::IntoResponse;
use axum::{routing::get, Router};
use serde::Serialize;

use crate::application::handlers::{GetWalletQuery, ListLedgerHistoryQuery};
use crate::domain::foundation::{Money, Timestamp, TransactionId, UserId, WalletId};
use crate::domain::ledger::{LedgerEntryStatus, LedgerEntryType, LedgerTransaction};

use super::auth::AuthenticatedUser;
use super::error::ApiError;
use super::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct LedgerEntryResponse {
    pub id: TransactionId,
    pub user_id: UserId,
    pub wallet_id: WalletId,
    pub amount: Money,
    pub reference: String,
    pub entry_type: LedgerEntryType,
    pub status: LedgerEntryStatus,
    pub description: String,
    pub created_at: Timestamp,
}

impl From<LedgerTransaction> for LedgerEntryResponse {
    fn from(entry: LedgerTransaction) -> Self {
        Self {
            id: entry.id,
            user_id: entry.user_id,
            wallet_id: entry.wallet_id,
            amount: entry.amount,
            reference: entry.reference.to_string(),
            entry_type: entry.entry_type,
            status: entry.status,
            description: entry.description,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerHistoryResponse {
    pub transactions: Vec<LedgerEntryResponse>,
}

/// GET /api/wallet
pub async fn get_wallet(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let wallet = state
        .wallet_handler()
        .handle(GetWalletQuery {
            farmer_id: user.user_id,
        })
        .await?;
    Ok(Json(wallet))
}

/// GET /api/wallet/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state
        .ledger_history_handler()
        .handle(ListLedgerHistoryQuery {
            user_id: user.user_id,
        })
        .await?;
    Ok(Json(LedgerHistoryResponse {
        transactions: entries.into_iter().map(LedgerEntryResponse::from).collect(),
    }))
}

/// Wallet routes, mounted at `/api/wallet`.
pub fn wallet_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_wallet))
        .route("/transactions", get(list_transactions))
}
