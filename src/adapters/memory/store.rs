//! In-memory marketplace store.
//!
//! All state lives behind one `tokio::sync::Mutex`, so every operation,
//! settlement included, is serialized. That lock plays the role of the row
//! locks a database would take.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::billing::{BillingTransaction, Plan, Subscription, SubscriptionStatus};
use crate::domain::foundation::{
    CropId, DomainError, ErrorCode, OrderId, PlanId, SubscriptionId, Timestamp, UserId,
};
use crate::domain::ledger::{LedgerTransaction, Wallet};
use crate::domain::marketplace::{Crop, Order, OrderStatus, OrderTransaction};
use crate::domain::payment::{PaymentReference, TransactionStatus};
use crate::ports::{
    BillingTransactionRepository, CropRepository, LedgerReader, OrderRepository,
    OrderTransactionRepository, PlanRepository, SubscriptionRepository,
};

#[derive(Debug, Default)]
pub(super) struct State {
    pub(super) plans: HashMap<PlanId, Plan>,
    pub(super) subscriptions: HashMap<SubscriptionId, Subscription>,
    pub(super) billing_transactions: HashMap<PaymentReference, BillingTransaction>,
    pub(super) crops: HashMap<CropId, Crop>,
    pub(super) orders: HashMap<OrderId, Order>,
    pub(super) order_transactions: HashMap<PaymentReference, OrderTransaction>,
    /// Keyed by farmer; at most one wallet per farmer.
    pub(super) wallets: HashMap<UserId, Wallet>,
    pub(super) ledger: Vec<LedgerTransaction>,
}

/// Shared in-memory store. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketplaceStore {
    pub(super) state: Arc<Mutex<State>>,
}

impl InMemoryMarketplaceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the standard plan catalogue.
    pub fn with_catalogue() -> Self {
        let state = State {
            plans: Plan::catalogue().into_iter().map(|p| (p.id, p)).collect(),
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    // === Seeding and inspection helpers ===

    pub async fn add_plan(&self, plan: Plan) {
        self.state.lock().await.plans.insert(plan.id, plan);
    }

    pub async fn add_crop(&self, crop: Crop) {
        self.state.lock().await.crops.insert(crop.id, crop);
    }

    pub async fn crop(&self, id: &CropId) -> Option<Crop> {
        self.state.lock().await.crops.get(id).cloned()
    }

    pub async fn order_transaction(&self, reference: &PaymentReference) -> Option<OrderTransaction> {
        self.state.lock().await.order_transactions.get(reference).cloned()
    }

    pub async fn billing_transaction(&self, reference: &PaymentReference) -> Option<BillingTransaction> {
        self.state.lock().await.billing_transactions.get(reference).cloned()
    }

    pub async fn add_ledger_entry(&self, entry: LedgerTransaction) {
        self.state.lock().await.ledger.push(entry);
    }

    pub async fn ledger_entries(&self) -> Vec<LedgerTransaction> {
        self.state.lock().await.ledger.clone()
    }

    pub async fn wallet_count(&self) -> usize {
        self.state.lock().await.wallets.len()
    }
}

fn not_found(code: ErrorCode, entity: &str, id: impl std::fmt::Display) -> DomainError {
    DomainError::new(code, format!("{} {} not found", entity, id))
}

#[async_trait]
impl PlanRepository for InMemoryMarketplaceStore {
    async fn list(&self) -> Result<Vec<Plan>, DomainError> {
        let mut plans: Vec<Plan> = self.state.lock().await.plans.values().cloned().collect();
        plans.sort_by(|a, b| {
            a.user_type
                .as_str()
                .cmp(b.user_type.as_str())
                .then(a.tier.cmp(&b.tier))
        });
        Ok(plans)
    }

    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError> {
        Ok(self.state.lock().await.plans.get(id).cloned())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryMarketplaceStore {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        self.state
            .lock()
            .await
            .subscriptions
            .insert(subscription.id, subscription.clone());
        Ok(())
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        match state.subscriptions.get_mut(&subscription.id) {
            Some(stored) => {
                *stored = subscription.clone();
                Ok(())
            }
            None => Err(not_found(ErrorCode::SubscriptionNotFound, "Subscription", subscription.id)),
        }
    }

    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        Ok(self.state.lock().await.subscriptions.get(id).cloned())
    }

    async fn find_current_for_user(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Option<Subscription>, DomainError> {
        let state = self.state.lock().await;
        let current = state
            .subscriptions
            .values()
            .filter(|s| &s.user_id == user_id && s.is_active_at(now))
            .max_by(|a, b| a.start_date.cmp(&b.start_date).then(a.id.cmp(&b.id)))
            .cloned();
        Ok(current)
    }

    async fn find_lapsed(&self, now: Timestamp) -> Result<Vec<Subscription>, DomainError> {
        let state = self.state.lock().await;
        Ok(state
            .subscriptions
            .values()
            .filter(|s| {
                s.status == SubscriptionStatus::Active
                    && s.end_date.map(|end| !end.is_after(&now)).unwrap_or(false)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BillingTransactionRepository for InMemoryMarketplaceStore {
    async fn save(&self, transaction: &BillingTransaction) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if state.billing_transactions.contains_key(&transaction.reference) {
            return Err(DomainError::new(
                ErrorCode::DuplicateReference,
                format!("Reference {} already exists", transaction.reference),
            ));
        }
        state
            .billing_transactions
            .insert(transaction.reference.clone(), transaction.clone());
        Ok(())
    }

    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<BillingTransaction>, DomainError> {
        Ok(self.state.lock().await.billing_transactions.get(reference).cloned())
    }
}

#[async_trait]
impl CropRepository for InMemoryMarketplaceStore {
    async fn find_by_id(&self, id: &CropId) -> Result<Option<Crop>, DomainError> {
        Ok(self.state.lock().await.crops.get(id).cloned())
    }
}

#[async_trait]
impl OrderRepository for InMemoryMarketplaceStore {
    async fn save(&self, order: &Order) -> Result<(), DomainError> {
        self.state.lock().await.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn update_status(&self, order: &Order, expected_status: OrderStatus) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        let stored = state
            .orders
            .get_mut(&order.id)
            .ok_or_else(|| not_found(ErrorCode::OrderNotFound, "Order", order.id))?;
        if stored.status != expected_status {
            return Err(DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!(
                    "Order {} changed from {} to {} concurrently",
                    order.id, expected_status, stored.status
                ),
            )
            .with_detail("from", stored.status.as_str())
            .with_detail("to", order.status.as_str()));
        }
        stored.status = order.status;
        stored.updated_at = order.updated_at;
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.state.lock().await.orders.get(id).cloned())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, DomainError> {
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| o.is_participant(user_id))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }
}

#[async_trait]
impl OrderTransactionRepository for InMemoryMarketplaceStore {
    async fn save(&self, transaction: &OrderTransaction) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if state.order_transactions.contains_key(&transaction.reference) {
            return Err(DomainError::new(
                ErrorCode::DuplicateReference,
                format!("Reference {} already exists", transaction.reference),
            ));
        }
        state
            .order_transactions
            .insert(transaction.reference.clone(), transaction.clone());
        Ok(())
    }

    async fn update_metadata(&self, transaction: &OrderTransaction) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if let Some(stored) = state.order_transactions.get_mut(&transaction.reference) {
            if stored.status == TransactionStatus::Initialized {
                stored.metadata = transaction.metadata.clone();
            }
        }
        Ok(())
    }

    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<OrderTransaction>, DomainError> {
        Ok(self.state.lock().await.order_transactions.get(reference).cloned())
    }

    async fn list_for_order(&self, order_id: &OrderId) -> Result<Vec<OrderTransaction>, DomainError> {
        let state = self.state.lock().await;
        let mut transactions: Vec<OrderTransaction> = state
            .order_transactions
            .values()
            .filter(|t| &t.order_id == order_id)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(transactions)
    }
}

#[async_trait]
impl LedgerReader for InMemoryMarketplaceStore {
    async fn find_wallet(&self, farmer_id: &UserId) -> Result<Option<Wallet>, DomainError> {
        Ok(self.state.lock().await.wallets.get(farmer_id).cloned())
    }

    async fn history_for_user(&self, user_id: &UserId) -> Result<Vec<LedgerTransaction>, DomainError> {
        let state = self.state.lock().await;
        let wallet_id = state.wallets.get(user_id).map(|w| w.id);
        let mut entries: Vec<LedgerTransaction> = state
            .ledger
            .iter()
            .filter(|e| &e.user_id == user_id || Some(e.wallet_id) == wallet_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn find_by_reference(
        &self,
        reference: &PaymentReference,
    ) -> Result<Option<LedgerTransaction>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.ledger.iter().find(|e| &e.reference == reference).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::PlanInterval;
    use crate::domain::foundation::Money;
    use crate::domain::marketplace::OrderAction;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn catalogue_is_listed_by_user_type_then_tier() {
        let store = InMemoryMarketplaceStore::with_catalogue();
        let plans = store.list().await.unwrap();

        assert_eq!(plans.len(), 8);
        assert_eq!(plans[0].name, "Buyer Free");
        assert_eq!(plans[1].name, "Buyer Standard");
    }

    #[tokio::test]
    async fn duplicate_order_reference_is_rejected() {
        let store = InMemoryMarketplaceStore::new();
        let crop = Crop::new(UserId::new(), "Yam", Money::new(dec!(500)).unwrap(), dec!(10));
        let mut order = Order::place(UserId::new(), &crop, dec!(2)).unwrap();
        let farmer = order.farmer_id;
        order.apply(OrderAction::Accept, &farmer).unwrap();
        let tx = OrderTransaction::initialize(&order, "NGN").unwrap();

        OrderTransactionRepository::save(&store, &tx).await.unwrap();
        let err = OrderTransactionRepository::save(&store, &tx).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateReference);
    }

    #[tokio::test]
    async fn metadata_update_skips_settled_transactions() {
        let store = InMemoryMarketplaceStore::new();
        let crop = Crop::new(UserId::new(), "Yam", Money::new(dec!(500)).unwrap(), dec!(10));
        let mut order = Order::place(UserId::new(), &crop, dec!(2)).unwrap();
        let farmer = order.farmer_id;
        order.apply(OrderAction::Accept, &farmer).unwrap();
        let mut tx = OrderTransaction::initialize(&order, "NGN").unwrap();
        OrderTransactionRepository::save(&store, &tx).await.unwrap();

        tx.record_checkout("https://checkout.example/1", None);
        store.update_metadata(&tx).await.unwrap();
        let stored = store.order_transaction(&tx.reference).await.unwrap();
        assert_eq!(stored.checkout().map(|(url, _)| url).as_deref(), Some("https://checkout.example/1"));

        {
            let mut state = store.state.lock().await;
            if let Some(row) = state.order_transactions.get_mut(&tx.reference) {
                row.status = TransactionStatus::Failed;
            }
        }
        tx.record_checkout("https://checkout.example/2", None);
        store.update_metadata(&tx).await.unwrap();
        let stored = store.order_transaction(&tx.reference).await.unwrap();
        assert_eq!(stored.checkout().map(|(url, _)| url).as_deref(), Some("https://checkout.example/1"));
    }

    #[tokio::test]
    async fn update_status_detects_concurrent_change() {
        let store = InMemoryMarketplaceStore::new();
        let crop = Crop::new(UserId::new(), "Yam", Money::new(dec!(500)).unwrap(), dec!(10));
        let order = Order::place(UserId::new(), &crop, dec!(2)).unwrap();
        OrderRepository::save(&store, &order).await.unwrap();

        let mut accepted = order.clone();
        accepted.apply(OrderAction::Accept, &order.farmer_id).unwrap();
        store.update_status(&accepted, OrderStatus::Pending).await.unwrap();

        let mut declined = order.clone();
        declined.apply(OrderAction::Decline, &order.farmer_id).unwrap();
        let err = store.update_status(&declined, OrderStatus::Pending).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidStateTransition);
    }

    #[tokio::test]
    async fn current_subscription_prefers_latest_start() {
        let store = InMemoryMarketplaceStore::new();
        let user = UserId::new();
        let t0 = Timestamp::now();

        let mut older = Subscription::create(user, PlanId::new());
        older.activate(PlanInterval::Yearly, t0.add_days(-10)).unwrap();
        let mut newer = Subscription::create(user, PlanId::new());
        newer.activate(PlanInterval::Monthly, t0.add_days(-1)).unwrap();
        SubscriptionRepository::save(&store, &older).await.unwrap();
        SubscriptionRepository::save(&store, &newer).await.unwrap();

        let current = store.find_current_for_user(&user, t0).await.unwrap().unwrap();
        assert_eq!(current.id, newer.id);
    }

    #[tokio::test]
    async fn lapsed_lists_only_expired_active_rows() {
        let store = InMemoryMarketplaceStore::new();
        let now = Timestamp::now();

        let mut lapsed = Subscription::create(UserId::new(), PlanId::new());
        lapsed.activate(PlanInterval::Monthly, now.add_days(-31)).unwrap();
        let mut live = Subscription::create(UserId::new(), PlanId::new());
        live.activate(PlanInterval::Monthly, now.add_days(-5)).unwrap();
        SubscriptionRepository::save(&store, &lapsed).await.unwrap();
        SubscriptionRepository::save(&store, &live).await.unwrap();

        let found = store.find_lapsed(now).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, lapsed.id);
    }
}
