//! GetWalletHandler - Query handler for a farmer's wallet balance.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::foundation::{Money, Timestamp, UserId, WalletId};
use crate::domain::payment::PaymentError;
use crate::ports::LedgerReader;

#[derive(Debug, Clone)]
pub struct GetWalletQuery {
    pub farmer_id: UserId,
}

/// Wallet as seen by its owner. `wallet_id` is `None` until the first
/// settled payment opens the wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletView {
    pub wallet_id: Option<WalletId>,
    pub farmer_id: UserId,
    pub balance: Money,
    pub updated_at: Option<Timestamp>,
}

pub struct GetWalletHandler {
    ledger: Arc<dyn LedgerReader>,
}

impl GetWalletHandler {
    pub fn new(ledger: Arc<dyn LedgerReader>) -> Self {
        Self { ledger }
    }

    /// Never opens a wallet; a farmer without one reads a zero balance.
    pub async fn handle(&self, query: GetWalletQuery) -> Result<WalletView, PaymentError> {
        let view = match self.ledger.find_wallet(&query.farmer_id).await? {
            Some(wallet) => WalletView {
                wallet_id: Some(wallet.id),
                farmer_id: wallet.farmer_id,
                balance: wallet.balance,
                updated_at: Some(wallet.updated_at),
            },
            None => WalletView {
                wallet_id: None,
                farmer_id: query.farmer_id,
                balance: Money::ZERO,
                updated_at: None,
            },
        };
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMarketplaceStore;

    #[tokio::test]
    async fn missing_wallet_reads_zero_without_opening_one() {
        let store = InMemoryMarketplaceStore::new();
        let handler = GetWalletHandler::new(Arc::new(store.clone()));
        let farmer_id = UserId::new();

        let view = handler.handle(GetWalletQuery { farmer_id }).await.unwrap();

        assert_eq!(view.balance, Money::ZERO);
        assert!(view.wallet_id.is_none());
        assert_eq!(store.wallet_count().await, 0);
    }
}
