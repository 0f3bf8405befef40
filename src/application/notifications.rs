//! Detached notification dispatch.
//!
//! Notifications never run inside a settlement and never fail the request
//! that triggered them. Each one is handed to a spawned task; failures are
//! logged at `warn`.

use std::sync::Arc;

use crate::ports::{Notification, Notifier};

#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Sends without waiting for the result.
    pub fn dispatch(&self, notification: Notification) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            let subject = notification.subject();
            let recipient = notification.recipient();
            if let Err(error) = notifier.notify(notification).await {
                tracing::warn!(%recipient, %subject, %error, "Notification delivery failed");
            }
        });
    }

    pub fn dispatch_all(&self, notifications: impl IntoIterator<Item = Notification>) {
        for notification in notifications {
            self.dispatch(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notify::RecordingNotifier;
    use crate::domain::foundation::{OrderId, UserId};
    use std::time::Duration;

    #[tokio::test]
    async fn dispatch_delivers_in_background() {
        let notifier = RecordingNotifier::new();
        let dispatcher = NotificationDispatcher::new(Arc::new(notifier.clone()));

        dispatcher.dispatch(Notification::OrderAccepted {
            buyer_id: UserId::new(),
            order_id: OrderId::new(),
        });

        let sent = notifier.wait_for(1, Duration::from_secs(1)).await;
        assert_eq!(sent.len(), 1);
    }

    #[tokio::test]
    async fn failed_delivery_does_not_panic_caller() {
        let dispatcher = NotificationDispatcher::new(Arc::new(RecordingNotifier::failing()));
        dispatcher.dispatch(Notification::OrderDeclined {
            buyer_id: UserId::new(),
            order_id: OrderId::new(),
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
