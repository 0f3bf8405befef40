use async_trait::async_trait;

use crate::domain::payment::PaymentError;
use crate::ports::{Notification, Notifier};

/// Emits each notification as an `info` event on the `notifications` target.
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), PaymentError> {
        let payload = serde_json::to_string(&notification)
            .map_err(|e| PaymentError::infrastructure(format!("notification encoding failed: {}", e)))?;
        tracing::info!(
            target: "notifications",
            recipient = %notification.recipient(),
            subject = %notification.subject(),
            payload = %payload,
            "Notification queued"
        );
        Ok(())
    }
}
