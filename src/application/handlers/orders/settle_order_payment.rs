//! SettleOrderPaymentHandler - Applies a gateway outcome to an order payment.
//!
//! Entered from the webhook and from explicit verification. The settlement
//! store does the atomic work; this handler logs the outcome and sends the
//! payment notifications after commit.

use std::sync::Arc;

use crate::application::NotificationDispatcher;
use crate::domain::marketplace::OrderSettlement;
use crate::domain::payment::{PaymentError, SettlementOutcome};
use crate::ports::{Notification, SettlementRequest, SettlementStore};

pub struct SettleOrderPaymentHandler {
    store: Arc<dyn SettlementStore>,
    notifications: NotificationDispatcher,
}

impl SettleOrderPaymentHandler {
    pub fn new(store: Arc<dyn SettlementStore>, notifications: NotificationDispatcher) -> Self {
        Self {
            store,
            notifications,
        }
    }

    pub async fn handle(
        &self,
        request: SettlementRequest,
    ) -> Result<SettlementOutcome<OrderSettlement>, PaymentError> {
        let reference = request.reference.clone();
        let outcome = self.store.settle_order_payment(request).await.map_err(|e| {
            tracing::error!(reference = %reference, error = %e, "Order settlement failed");
            e
        })?;

        match &outcome {
            SettlementOutcome::Settled(settlement) => {
                tracing::info!(
                    reference = %reference,
                    order_id = %settlement.order_id,
                    amount = %settlement.amount,
                    wallet_balance = %settlement.wallet_balance,
                    anomalies = settlement.anomalies.len(),
                    "Order payment settled"
                );
                self.notifications.dispatch_all(notifications_for(settlement));
            }
            SettlementOutcome::Unapplied(anomaly) => {
                tracing::error!(
                    reference = %reference,
                    code = anomaly.code(),
                    error = %anomaly,
                    "Order payment captured but not applied"
                );
            }
            other => {
                tracing::info!(reference = %reference, outcome = %other.kind(), "Order settlement finished");
            }
        }

        Ok(outcome)
    }
}

fn notifications_for(settlement: &OrderSettlement) -> Vec<Notification> {
    let amount = settlement.amount.to_string();
    let mut notifications = vec![
        Notification::PaymentReceived {
            farmer_id: settlement.farmer_id,
            order_id: settlement.order_id,
            amount: amount.clone(),
        },
        Notification::PaymentConfirmed {
            buyer_id: settlement.buyer_id,
            order_id: settlement.order_id,
            amount,
        },
    ];
    if settlement.out_of_stock() {
        notifications.push(Notification::OutOfStock {
            farmer_id: settlement.farmer_id,
            crop_name: settlement.crop_name.clone(),
        });
    }
    notifications
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMarketplaceStore;
    use crate::adapters::notify::RecordingNotifier;
    use crate::domain::foundation::{Money, UserId};
    use crate::domain::marketplace::{Crop, Order, OrderAction, OrderTransaction};
    use crate::domain::payment::GatewayStatus;
    use crate::ports::{OrderRepository, OrderTransactionRepository};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    async fn paid_setup(stock: Decimal, quantity: Decimal) -> (SettleOrderPaymentHandler, RecordingNotifier, OrderTransaction) {
        let store = InMemoryMarketplaceStore::new();
        let farmer = UserId::new();
        let mut crop = Crop::new(farmer, "Onions", Money::new(dec!(1000)).unwrap(), quantity);
        let mut order = Order::place(UserId::new(), &crop, quantity).unwrap();
        order.apply(OrderAction::Accept, &farmer).unwrap();
        crop.quantity_kg = stock;
        store.add_crop(crop).await;
        OrderRepository::save(&store, &order).await.unwrap();
        let tx = OrderTransaction::initialize(&order, "NGN").unwrap();
        OrderTransactionRepository::save(&store, &tx).await.unwrap();

        let notifier = RecordingNotifier::new();
        let handler = SettleOrderPaymentHandler::new(
            Arc::new(store),
            NotificationDispatcher::new(Arc::new(notifier.clone())),
        );
        (handler, notifier, tx)
    }

    #[tokio::test]
    async fn settled_payment_notifies_buyer_and_farmer() {
        let (handler, notifier, tx) = paid_setup(dec!(100), dec!(10)).await;

        let outcome = handler
            .handle(SettlementRequest::new(tx.reference.clone(), GatewayStatus::Success))
            .await
            .unwrap();

        assert!(matches!(outcome, SettlementOutcome::Settled(_)));
        let sent = notifier.wait_for(2, Duration::from_secs(1)).await;
        assert_eq!(sent.len(), 2);
    }

    #[tokio::test]
    async fn selling_out_adds_out_of_stock_notice() {
        let (handler, notifier, tx) = paid_setup(dec!(10), dec!(10)).await;

        handler
            .handle(SettlementRequest::new(tx.reference.clone(), GatewayStatus::Success))
            .await
            .unwrap();

        let sent = notifier.wait_for(3, Duration::from_secs(1)).await;
        assert!(sent.iter().any(|n| matches!(n, Notification::OutOfStock { .. })));
    }

    #[tokio::test]
    async fn duplicate_sends_nothing_more() {
        let (handler, notifier, tx) = paid_setup(dec!(100), dec!(10)).await;
        let request = SettlementRequest::new(tx.reference.clone(), GatewayStatus::Success);

        handler.handle(request.clone()).await.unwrap();
        notifier.wait_for(2, Duration::from_secs(1)).await;
        let second = handler.handle(request).await.unwrap();

        assert_eq!(second, SettlementOutcome::AlreadyProcessed);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(notifier.sent().len(), 2);
    }

    #[tokio::test]
    async fn charge_for_cancelled_order_notifies_nobody() {
        let store = InMemoryMarketplaceStore::new();
        let farmer = UserId::new();
        let crop = Crop::new(farmer, "Onions", Money::new(dec!(1000)).unwrap(), dec!(50));
        store.add_crop(crop.clone()).await;
        let mut order = Order::place(UserId::new(), &crop, dec!(5)).unwrap();
        order.apply(OrderAction::Accept, &farmer).unwrap();
        let tx = OrderTransaction::initialize(&order, "NGN").unwrap();
        let buyer = order.buyer_id;
        order.apply(OrderAction::Cancel, &buyer).unwrap();
        OrderRepository::save(&store, &order).await.unwrap();
        OrderTransactionRepository::save(&store, &tx).await.unwrap();

        let notifier = RecordingNotifier::new();
        let handler = SettleOrderPaymentHandler::new(
            Arc::new(store.clone()),
            NotificationDispatcher::new(Arc::new(notifier.clone())),
        );
        let outcome = handler
            .handle(SettlementRequest::new(tx.reference.clone(), GatewayStatus::Success))
            .await
            .unwrap();

        assert!(matches!(outcome, SettlementOutcome::Unapplied(PaymentError::OrderNotPayable { .. })));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(notifier.sent().is_empty());
    }
}
