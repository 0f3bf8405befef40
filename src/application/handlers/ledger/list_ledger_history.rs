//! ListLedgerHistoryHandler - Query handler for a user's ledger entries.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::ledger::LedgerTransaction;
use crate::domain::payment::PaymentError;
use crate::ports::LedgerReader;

#[derive(Debug, Clone)]
pub struct ListLedgerHistoryQuery {
    pub user_id: UserId,
}

pub struct ListLedgerHistoryHandler {
    ledger: Arc<dyn LedgerReader>,
}

impl ListLedgerHistoryHandler {
    pub fn new(ledger: Arc<dyn LedgerReader>) -> Self {
        Self { ledger }
    }

    pub async fn handle(&self, query: ListLedgerHistoryQuery) -> Result<Vec<LedgerTransaction>, PaymentError> {
        Ok(self.ledger.history_for_user(&query.user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMarketplaceStore;
    use crate::domain::foundation::Money;
    use crate::domain::marketplace::{Crop, Order, OrderAction, OrderTransaction};
    use crate::domain::payment::GatewayStatus;
    use crate::ports::{OrderRepository, OrderTransactionRepository, SettlementRequest, SettlementStore};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn buyer_and_farmer_both_see_the_payment() {
        let store = InMemoryMarketplaceStore::new();
        let farmer = UserId::new();
        let buyer = UserId::new();
        let crop = Crop::new(farmer, "Yam", Money::new(dec!(800)).unwrap(), dec!(50));
        let mut order = Order::place(buyer, &crop, dec!(5)).unwrap();
        order.apply(OrderAction::Accept, &farmer).unwrap();
        store.add_crop(crop).await;
        OrderRepository::save(&store, &order).await.unwrap();
        let tx = OrderTransaction::initialize(&order, "NGN").unwrap();
        OrderTransactionRepository::save(&store, &tx).await.unwrap();
        store
            .settle_order_payment(SettlementRequest::new(tx.reference.clone(), GatewayStatus::Success))
            .await
            .unwrap();
        let handler = ListLedgerHistoryHandler::new(Arc::new(store));

        let farmer_view = handler.handle(ListLedgerHistoryQuery { user_id: farmer }).await.unwrap();
        let buyer_view = handler.handle(ListLedgerHistoryQuery { user_id: buyer }).await.unwrap();
        let stranger_view = handler
            .handle(ListLedgerHistoryQuery { user_id: UserId::new() })
            .await
            .unwrap();

        assert_eq!(farmer_view.len(), 1);
        assert_eq!(buyer_view, farmer_view);
        assert_eq!(farmer_view[0].reference, tx.reference);
        assert!(stranger_view.is_empty());
    }
}
