//! Shared application state for the HTTP adapter.

use std::sync::Arc;

use sqlx::PgPool;

use crate::application::handlers::{
    CancelSubscriptionHandler, CreateSubscriptionHandler, GetCurrentSubscriptionHandler,
    GetSubscriptionHandler, GetWalletHandler, HandleGatewayWebhookHandler, InitializeOrderPaymentHandler,
    InitializeSubscriptionPaymentHandler, ListLedgerHistoryHandler, ListOrdersHandler,
    ListPlansHandler, OrderActionHandler, PlaceOrderHandler, SettleOrderPaymentHandler,
    SettleSubscriptionPaymentHandler, VerifyOrderPaymentHandler, VerifySubscriptionPaymentHandler,
};
use crate::adapters::postgres::{
    PostgresBillingTransactionRepository, PostgresCropRepository, PostgresLedgerReader,
    PostgresOrderRepository, PostgresOrderTransactionRepository, PostgresPlanRepository,
    PostgresSettlementStore, PostgresSubscriptionRepository,
};
use crate::application::NotificationDispatcher;
use crate::config::PaymentConfig;
use crate::domain::payment::WebhookSignatureVerifier;
use crate::ports::{
    BillingTransactionRepository, CropRepository, LedgerReader, Notifier, OrderRepository,
    OrderTransactionRepository, PaymentGateway, PlanRepository, SettlementStore,
    SubscriptionRepository,
};

/// Cloned into every request. Handlers are built on demand from the
/// Arc-wrapped ports.
#[derive(Clone)]
pub struct AppState {
    pub plans: Arc<dyn PlanRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub billing_transactions: Arc<dyn BillingTransactionRepository>,
    pub crops: Arc<dyn CropRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub order_transactions: Arc<dyn OrderTransactionRepository>,
    pub ledger: Arc<dyn LedgerReader>,
    pub settlement: Arc<dyn SettlementStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub notifications: NotificationDispatcher,
    pub verifier: WebhookSignatureVerifier,
    pub currency: String,
    pub callback_url: Option<String>,
}

impl AppState {
    /// Wires every port to one store, as the in-memory adapter provides.
    pub fn with_store<S>(
        store: S,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        payment: &PaymentConfig,
    ) -> Self
    where
        S: PlanRepository
            + SubscriptionRepository
            + BillingTransactionRepository
            + CropRepository
            + OrderRepository
            + OrderTransactionRepository
            + LedgerReader
            + SettlementStore
            + Clone
            + 'static,
    {
        Self {
            plans: Arc::new(store.clone()),
            subscriptions: Arc::new(store.clone()),
            billing_transactions: Arc::new(store.clone()),
            crops: Arc::new(store.clone()),
            orders: Arc::new(store.clone()),
            order_transactions: Arc::new(store.clone()),
            ledger: Arc::new(store.clone()),
            settlement: Arc::new(store),
            gateway,
            notifications: NotificationDispatcher::new(notifier),
            verifier: WebhookSignatureVerifier::new(payment.secret_key.clone()),
            currency: payment.currency.clone(),
            callback_url: payment.callback_url.clone(),
        }
    }

    /// Wires every port to its PostgreSQL repository over one pool.
    pub fn with_postgres(
        pool: PgPool,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
        payment: &PaymentConfig,
    ) -> Self {
        Self {
            plans: Arc::new(PostgresPlanRepository::new(pool.clone())),
            subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
            billing_transactions: Arc::new(PostgresBillingTransactionRepository::new(pool.clone())),
            crops: Arc::new(PostgresCropRepository::new(pool.clone())),
            orders: Arc::new(PostgresOrderRepository::new(pool.clone())),
            order_transactions: Arc::new(PostgresOrderTransactionRepository::new(pool.clone())),
            ledger: Arc::new(PostgresLedgerReader::new(pool.clone())),
            settlement: Arc::new(PostgresSettlementStore::new(pool)),
            gateway,
            notifications: NotificationDispatcher::new(notifier),
            verifier: WebhookSignatureVerifier::new(payment.secret_key.clone()),
            currency: payment.currency.clone(),
            callback_url: payment.callback_url.clone(),
        }
    }

    // Orders

    pub fn place_order_handler(&self) -> PlaceOrderHandler {
        PlaceOrderHandler::new(self.crops.clone(), self.orders.clone(), self.notifications.clone())
    }

    pub fn order_action_handler(&self) -> OrderActionHandler {
        OrderActionHandler::new(self.orders.clone(), self.notifications.clone())
    }

    pub fn list_orders_handler(&self) -> ListOrdersHandler {
        ListOrdersHandler::new(self.orders.clone())
    }

    pub fn initialize_order_payment_handler(&self) -> InitializeOrderPaymentHandler {
        InitializeOrderPaymentHandler::new(
            self.orders.clone(),
            self.order_transactions.clone(),
            self.gateway.clone(),
            self.currency.clone(),
            self.callback_url.clone(),
        )
    }

    pub fn settle_order_handler(&self) -> Arc<SettleOrderPaymentHandler> {
        Arc::new(SettleOrderPaymentHandler::new(
            self.settlement.clone(),
            self.notifications.clone(),
        ))
    }

    pub fn verify_order_payment_handler(&self) -> VerifyOrderPaymentHandler {
        VerifyOrderPaymentHandler::new(
            self.orders.clone(),
            self.order_transactions.clone(),
            self.gateway.clone(),
            self.settle_order_handler(),
        )
    }

    // Billing

    pub fn list_plans_handler(&self) -> ListPlansHandler {
        ListPlansHandler::new(self.plans.clone())
    }

    pub fn create_subscription_handler(&self) -> CreateSubscriptionHandler {
        CreateSubscriptionHandler::new(self.plans.clone(), self.subscriptions.clone())
    }

    pub fn current_subscription_handler(&self) -> GetCurrentSubscriptionHandler {
        GetCurrentSubscriptionHandler::new(self.plans.clone(), self.subscriptions.clone())
    }

    pub fn subscription_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.plans.clone(), self.subscriptions.clone())
    }

    pub fn cancel_subscription_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(self.subscriptions.clone())
    }

    pub fn initialize_subscription_payment_handler(&self) -> InitializeSubscriptionPaymentHandler {
        InitializeSubscriptionPaymentHandler::new(
            self.plans.clone(),
            self.subscriptions.clone(),
            self.billing_transactions.clone(),
            self.gateway.clone(),
            self.currency.clone(),
            self.callback_url.clone(),
        )
    }

    pub fn settle_subscription_handler(&self) -> Arc<SettleSubscriptionPaymentHandler> {
        Arc::new(SettleSubscriptionPaymentHandler::new(
            self.settlement.clone(),
            self.notifications.clone(),
        ))
    }

    pub fn verify_subscription_payment_handler(&self) -> VerifySubscriptionPaymentHandler {
        VerifySubscriptionPaymentHandler::new(
            self.billing_transactions.clone(),
            self.gateway.clone(),
            self.settle_subscription_handler(),
        )
    }

    // Ledger

    pub fn wallet_handler(&self) -> GetWalletHandler {
        GetWalletHandler::new(self.ledger.clone())
    }

    pub fn ledger_history_handler(&self) -> ListLedgerHistoryHandler {
        ListLedgerHistoryHandler::new(self.ledger.clone())
    }

    // Webhooks

    pub fn webhook_handler(&self) -> HandleGatewayWebhookHandler {
        HandleGatewayWebhookHandler::new(
            self.verifier.clone(),
            self.settle_order_handler(),
            self.settle_subscription_handler(),
        )
    }
}
