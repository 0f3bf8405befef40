//! End-to-end settlement scenarios against the in-memory store.

mod common;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;

use common::Harness;
use farm_ledger::application::handlers::{
    CreateSubscriptionCommand, InitializeOrderPaymentCommand, InitializeSubscriptionPaymentCommand,
    InitializeSubscriptionPaymentResult, ListOrdersQuery, VerifyOrderPaymentCommand,
};
use farm_ledger::domain::billing::{PlanInterval, SubscriptionStatus};
use farm_ledger::domain::foundation::{Money, Timestamp};
use farm_ledger::domain::marketplace::OrderStatus;
use farm_ledger::domain::payment::{
    GatewayStatus, OutcomeKind, PaymentError, SettlementOutcome, TransactionStatus,
};
use farm_ledger::ports::{
    LedgerReader, OrderRepository, PlanRepository, SettlementRequest, SubscriptionRepository,
};

#[tokio::test]
async fn paid_order_moves_stock_and_credits_farmer() {
    let h = Harness::new();
    let crop = h.list_crop(dec!(100)).await;
    let (order, reference) = h.payable_order(&crop, dec!(10)).await;
    assert_eq!(order.total_price, Money::new(dec!(10000)).unwrap());

    let outcome = h
        .state
        .settle_order_handler()
        .handle(SettlementRequest::new(reference.clone(), GatewayStatus::Success))
        .await
        .unwrap();
    assert_eq!(outcome.kind(), OutcomeKind::Settled);

    let order = OrderRepository::find_by_id(&h.store, &order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(h.store.crop(&crop.id).await.unwrap().quantity_kg, dec!(90));

    let wallet = h.store.find_wallet(&h.farmer).await.unwrap().unwrap();
    assert_eq!(wallet.balance, Money::new(dec!(10000)).unwrap());

    let entries = h.store.ledger_entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].reference, reference);
    assert_eq!(entries[0].user_id, h.buyer);

    let tx = h.store.order_transaction(&reference).await.unwrap();
    assert_eq!(tx.status, TransactionStatus::Success);
}

#[tokio::test]
async fn second_settlement_of_same_reference_is_a_no_op() {
    let h = Harness::new();
    let crop = h.list_crop(dec!(100)).await;
    let (_, reference) = h.payable_order(&crop, dec!(10)).await;
    let settle = h.state.settle_order_handler();

    settle
        .handle(SettlementRequest::new(reference.clone(), GatewayStatus::Success))
        .await
        .unwrap();
    let second = settle
        .handle(SettlementRequest::new(reference.clone(), GatewayStatus::Success))
        .await
        .unwrap();

    assert!(matches!(second, SettlementOutcome::AlreadyProcessed));
    assert!(second.is_accepted());
    let wallet = h.store.find_wallet(&h.farmer).await.unwrap().unwrap();
    assert_eq!(wallet.balance, Money::new(dec!(10000)).unwrap());
    assert_eq!(h.store.ledger_entries().await.len(), 1);
    assert_eq!(h.store.crop(&crop.id).await.unwrap().quantity_kg, dec!(90));
}

#[tokio::test]
async fn opening_checkout_twice_charges_one_reference() {
    let h = Harness::new();
    let crop = h.list_crop(dec!(100)).await;
    let (order, reference) = h.payable_order(&crop, dec!(10)).await;

    let again = h
        .state
        .initialize_order_payment_handler()
        .handle(InitializeOrderPaymentCommand {
            buyer_id: h.buyer,
            buyer_email: "buyer@example.com".to_string(),
            order_id: order.id,
            callback_url: None,
        })
        .await
        .unwrap();
    assert_eq!(again.reference, reference);
    assert_eq!(h.gateway.initialize_count(), 1);

    let settle = h.state.settle_order_handler();
    let first = settle
        .handle(SettlementRequest::new(reference.clone(), GatewayStatus::Success))
        .await
        .unwrap();
    let second = settle
        .handle(SettlementRequest::new(again.reference.clone(), GatewayStatus::Success))
        .await
        .unwrap();

    assert_eq!(first.kind(), OutcomeKind::Settled);
    assert_eq!(second.kind(), OutcomeKind::AlreadyProcessed);
    assert_eq!(h.store.ledger_entries().await.len(), 1);
}

#[tokio::test]
async fn verify_after_webhook_reports_already_processed() {
    let h = Harness::new();
    let crop = h.list_crop(dec!(100)).await;
    let (_, reference) = h.payable_order(&crop, dec!(4)).await;

    h.state
        .settle_order_handler()
        .handle(SettlementRequest::new(reference.clone(), GatewayStatus::Success))
        .await
        .unwrap();

    let verified = h
        .state
        .verify_order_payment_handler()
        .handle(VerifyOrderPaymentCommand {
            user_id: h.buyer,
            reference: reference.to_string(),
        })
        .await
        .unwrap();

    assert_eq!(verified.outcome, OutcomeKind::AlreadyProcessed);
    assert_eq!(h.store.ledger_entries().await.len(), 1);
}

#[tokio::test]
async fn concurrent_settlements_credit_exactly_once() {
    let h = Harness::new();
    let crop = h.list_crop(dec!(100)).await;
    let (_, reference) = h.payable_order(&crop, dec!(10)).await;
    let settle = h.state.settle_order_handler();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let settle = Arc::clone(&settle);
            let reference = reference.clone();
            tokio::spawn(async move {
                settle
                    .handle(SettlementRequest::new(reference, GatewayStatus::Success))
                    .await
            })
        })
        .collect();

    let mut settled = 0;
    for task in tasks {
        match task.await.unwrap().unwrap() {
            SettlementOutcome::Settled(_) => settled += 1,
            SettlementOutcome::AlreadyProcessed => {}
            other => panic!("unexpected outcome {:?}", other.kind()),
        }
    }

    assert_eq!(settled, 1);
    let wallet = h.store.find_wallet(&h.farmer).await.unwrap().unwrap();
    assert_eq!(wallet.balance, Money::new(dec!(10000)).unwrap());
    assert_eq!(h.store.ledger_entries().await.len(), 1);
    assert_eq!(h.store.wallet_count().await, 1);
}

#[tokio::test]
async fn failed_payment_changes_nothing_but_the_transaction() {
    let h = Harness::new();
    let crop = h.list_crop(dec!(100)).await;
    let (order, reference) = h.payable_order(&crop, dec!(10)).await;

    let outcome = h
        .state
        .settle_order_handler()
        .handle(SettlementRequest::new(reference.clone(), GatewayStatus::Failed))
        .await
        .unwrap();

    assert_eq!(outcome.kind(), OutcomeKind::Failed);
    let order = OrderRepository::find_by_id(&h.store, &order.id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Accepted);
    assert_eq!(h.store.crop(&crop.id).await.unwrap().quantity_kg, dec!(100));
    assert!(h.store.find_wallet(&h.farmer).await.unwrap().is_none());
    assert_eq!(
        h.store.order_transaction(&reference).await.unwrap().status,
        TransactionStatus::Failed
    );
}

#[tokio::test]
async fn monthly_subscription_runs_thirty_days_from_payment() {
    let h = Harness::new();
    let plan = PlanRepository::list(&h.store)
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.name == "Farmer Premium")
        .unwrap();
    assert_eq!(plan.interval, PlanInterval::Monthly);

    let created = h
        .state
        .create_subscription_handler()
        .handle(CreateSubscriptionCommand {
            user_id: h.farmer,
            plan_id: plan.id,
        })
        .await
        .unwrap();

    let reference = match h
        .state
        .initialize_subscription_payment_handler()
        .handle(InitializeSubscriptionPaymentCommand {
            user_id: h.farmer,
            email: "farmer@example.com".to_string(),
            subscription_id: created.subscription.id,
            callback_url: None,
        })
        .await
        .unwrap()
    {
        InitializeSubscriptionPaymentResult::Checkout { reference, .. } => reference,
        other => panic!("expected checkout, got {:?}", other),
    };

    let paid_at = Timestamp::from_datetime(
        DateTime::parse_from_rfc3339("2024-05-01T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc),
    );
    let mut request = SettlementRequest::new(reference, GatewayStatus::Success);
    request.at = paid_at;
    let outcome = h.state.settle_subscription_handler().handle(request).await.unwrap();
    assert_eq!(outcome.kind(), OutcomeKind::Settled);

    let subscription = SubscriptionRepository::find_by_id(&h.store, &created.subscription.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(subscription.status, SubscriptionStatus::Active);
    assert_eq!(subscription.start_date, Some(paid_at));
    assert_eq!(subscription.end_date, Some(paid_at.add_days(30)));
    assert!(h.store.ledger_entries().await.is_empty());
}

#[tokio::test]
async fn order_above_stock_is_rejected_without_a_row() {
    let h = Harness::new();
    let crop = h.list_crop(dec!(100)).await;

    let result = h
        .state
        .place_order_handler()
        .handle(farm_ledger::application::handlers::PlaceOrderCommand {
            buyer_id: h.buyer,
            crop_id: crop.id,
            quantity_kg: dec!(150),
        })
        .await;

    assert!(matches!(result, Err(PaymentError::ValidationFailed { .. })));
    let orders = h
        .state
        .list_orders_handler()
        .handle(ListOrdersQuery { user_id: h.buyer })
        .await
        .unwrap();
    assert!(orders.is_empty());
}
