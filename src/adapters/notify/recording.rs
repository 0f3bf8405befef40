use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::payment::PaymentError;
use crate::ports::{Notification, Notifier};

/// Captures notifications for assertions; can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every delivery fails.
    pub fn failing() -> Self {
        let notifier = Self::default();
        *lock(&notifier.failing) = true;
        notifier
    }

    pub fn sent(&self) -> Vec<Notification> {
        lock(&self.sent).clone()
    }

    /// Waits until at least `count` notifications arrived or the timeout passes.
    pub async fn wait_for(&self, count: usize, timeout: std::time::Duration) -> Vec<Notification> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let sent = self.sent();
            if sent.len() >= count || tokio::time::Instant::now() >= deadline {
                return sent;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), PaymentError> {
        if *lock(&self.failing) {
            return Err(PaymentError::infrastructure("notification channel down"));
        }
        lock(&self.sent).push(notification);
        Ok(())
    }
}
