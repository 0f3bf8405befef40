//! OrderActionHandler - Command handler for participant order transitions.

use std::sync::Arc;

use crate::application::NotificationDispatcher;
use crate::domain::foundation::{OrderId, UserId};
use crate::domain::marketplace::{Order, OrderAction};
use crate::domain::payment::PaymentError;
use crate::ports::{Notification, OrderRepository};

#[derive(Debug, Clone)]
pub struct OrderActionCommand {
    pub actor_id: UserId,
    pub order_id: OrderId,
    pub action: OrderAction,
}

#[derive(Debug, Clone)]
pub struct OrderActionResult {
    pub order: Order,
}

/// Applies accept, decline, ship, complete or cancel.
///
/// The state change is saved before any notification is sent; a failed
/// notification does not undo it.
pub struct OrderActionHandler {
    orders: Arc<dyn OrderRepository>,
    notifications: NotificationDispatcher,
}

impl OrderActionHandler {
    pub fn new(orders: Arc<dyn OrderRepository>, notifications: NotificationDispatcher) -> Self {
        Self {
            orders,
            notifications,
        }
    }

    pub async fn handle(&self, cmd: OrderActionCommand) -> Result<OrderActionResult, PaymentError> {
        let mut order = self
            .orders
            .find_by_id(&cmd.order_id)
            .await?
            .ok_or_else(|| PaymentError::not_found("Order", cmd.order_id))?;

        let previous = order.status;
        order.apply(cmd.action, &cmd.actor_id)?;
        self.orders.update_status(&order, previous).await?;

        tracing::info!(
            order_id = %order.id,
            action = %cmd.action,
            from = %previous,
            to = %order.status,
            "Order updated"
        );

        match cmd.action {
            OrderAction::Accept => self.notifications.dispatch(Notification::OrderAccepted {
                buyer_id: order.buyer_id,
                order_id: order.id,
            }),
            OrderAction::Decline => self.notifications.dispatch(Notification::OrderDeclined {
                buyer_id: order.buyer_id,
                order_id: order.id,
            }),
            _ => {}
        }

        Ok(OrderActionResult { order })
    }
}
