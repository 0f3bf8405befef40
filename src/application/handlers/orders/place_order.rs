//! PlaceOrderHandler - Command handler for placing an order on a listing.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::NotificationDispatcher;
use crate::domain::foundation::{CropId, UserId};
use crate::domain::marketplace::Order;
use crate::domain::payment::PaymentError;
use crate::ports::{CropRepository, Notification, OrderRepository};

#[derive(Debug, Clone)]
pub struct PlaceOrderCommand {
    pub buyer_id: UserId,
    pub crop_id: CropId,
    pub quantity_kg: Decimal,
}

#[derive(Debug, Clone)]
pub struct PlaceOrderResult {
    pub order: Order,
}

/// Places an order in `PENDING` after checking quantity against current
/// stock. Nothing is written when validation fails.
pub struct PlaceOrderHandler {
    crops: Arc<dyn CropRepository>,
    orders: Arc<dyn OrderRepository>,
    notifications: NotificationDispatcher,
}

impl PlaceOrderHandler {
    pub fn new(
        crops: Arc<dyn CropRepository>,
        orders: Arc<dyn OrderRepository>,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            crops,
            orders,
            notifications,
        }
    }

    pub async fn handle(&self, cmd: PlaceOrderCommand) -> Result<PlaceOrderResult, PaymentError> {
        let crop = self
            .crops
            .find_by_id(&cmd.crop_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Crop", cmd.crop_id))?;

        let order = Order::place(cmd.buyer_id, &crop, cmd.quantity_kg)?;
        self.orders.save(&order).await?;

        tracing::info!(
            order_id = %order.id,
            crop_id = %crop.id,
            quantity_kg = %order.quantity_kg,
            total = %order.total_price,
            "Order placed"
        );
        self.notifications.dispatch(Notification::OrderPlaced {
            farmer_id: order.farmer_id,
            order_id: order.id,
            crop_name: order.crop_name.clone(),
        });

        Ok(PlaceOrderResult { order })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryMarketplaceStore;
    use crate::adapters::notify::RecordingNotifier;
    use crate::domain::foundation::Money;
    use crate::domain::marketplace::{Crop, OrderStatus};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    async fn setup() -> (PlaceOrderHandler, InMemoryMarketplaceStore, RecordingNotifier, Crop) {
        let store = InMemoryMarketplaceStore::new();
        let crop = Crop::new(UserId::new(), "Tomatoes", Money::new(dec!(1000)).unwrap(), dec!(100));
        store.add_crop(crop.clone()).await;
        let notifier = RecordingNotifier::new();
        let handler = PlaceOrderHandler::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            NotificationDispatcher::new(Arc::new(notifier.clone())),
        );
        (handler, store, notifier, crop)
    }

    #[tokio::test]
    async fn places_pending_order_and_notifies_farmer() {
        let (handler, _, notifier, crop) = setup().await;

        let result = handler
            .handle(PlaceOrderCommand {
                buyer_id: UserId::new(),
                crop_id: crop.id,
                quantity_kg: dec!(10),
            })
            .await
            .unwrap();

        assert_eq!(result.order.status, OrderStatus::Pending);
        assert_eq!(result.order.total_price, Money::new(dec!(10000)).unwrap());
        let sent = notifier.wait_for(1, Duration::from_secs(1)).await;
        assert_eq!(sent[0].recipient(), crop.farmer_id);
    }

    #[tokio::test]
    async fn quantity_above_stock_writes_nothing() {
        let (handler, store, _, crop) = setup().await;
        let buyer = UserId::new();

        let err = handler
            .handle(PlaceOrderCommand {
                buyer_id: buyer,
                crop_id: crop.id,
                quantity_kg: dec!(150),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, PaymentError::ValidationFailed { .. }));
        assert!(store.list_for_user(&buyer).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_crop_is_not_found() {
        let (handler, _, _, _) = setup().await;
        let err = handler
            .handle(PlaceOrderCommand {
                buyer_id: UserId::new(),
                crop_id: CropId::new(),
                quantity_kg: dec!(1),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::NotFound { .. }));
    }
}
