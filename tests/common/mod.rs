//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use farm_ledger::adapters::http::AppState;
use farm_ledger::adapters::{InMemoryMarketplaceStore, MockPaymentGateway, RecordingNotifier};
use farm_ledger::application::handlers::{
    InitializeOrderPaymentCommand, OrderActionCommand, PlaceOrderCommand,
};
use farm_ledger::config::PaymentConfig;
use farm_ledger::domain::foundation::{Money, UserId};
use farm_ledger::domain::marketplace::{Crop, Order, OrderAction};
use farm_ledger::domain::payment::PaymentReference;

pub const SECRET: &str = "sk_test_integration";

pub struct Harness {
    pub store: InMemoryMarketplaceStore,
    pub gateway: MockPaymentGateway,
    pub notifier: RecordingNotifier,
    pub state: AppState,
    pub farmer: UserId,
    pub buyer: UserId,
}

impl Harness {
    pub fn new() -> Self {
        let store = InMemoryMarketplaceStore::with_catalogue();
        let gateway = MockPaymentGateway::new();
        let notifier = RecordingNotifier::new();
        let state = AppState::with_store(
            store.clone(),
            Arc::new(gateway.clone()),
            Arc::new(notifier.clone()),
            &PaymentConfig::new(SECRET),
        );
        Self {
            store,
            gateway,
            notifier,
            state,
            farmer: UserId::new(),
            buyer: UserId::new(),
        }
    }

    /// Lists a crop for the harness farmer at 1000 per kg.
    pub async fn list_crop(&self, quantity_kg: Decimal) -> Crop {
        let crop = Crop::new(
            self.farmer,
            "Yam",
            Money::new(dec!(1000)).expect("valid price"),
            quantity_kg,
        );
        self.store.add_crop(crop.clone()).await;
        crop
    }

    pub async fn place_order(&self, crop: &Crop, quantity_kg: Decimal) -> Order {
        self.state
            .place_order_handler()
            .handle(PlaceOrderCommand {
                buyer_id: self.buyer,
                crop_id: crop.id,
                quantity_kg,
            })
            .await
            .expect("order placed")
            .order
    }

    /// Places, accepts and opens a payment for an order.
    pub async fn payable_order(&self, crop: &Crop, quantity_kg: Decimal) -> (Order, PaymentReference) {
        let order = self.place_order(crop, quantity_kg).await;
        let order = self
            .state
            .order_action_handler()
            .handle(OrderActionCommand {
                actor_id: self.farmer,
                order_id: order.id,
                action: OrderAction::Accept,
            })
            .await
            .expect("order accepted")
            .order;
        let checkout = self
            .state
            .initialize_order_payment_handler()
            .handle(InitializeOrderPaymentCommand {
                buyer_id: self.buyer,
                buyer_email: "buyer@example.com".to_string(),
                order_id: order.id,
                callback_url: None,
            })
            .await
            .expect("payment initialized");
        (order, checkout.reference)
    }
}
