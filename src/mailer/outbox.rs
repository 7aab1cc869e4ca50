use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{MailError, Mailer, Notification};

/// Keeps every notification in memory instead of delivering it.
///
/// Used when no SMTP server is configured and by tests to inspect deliveries.
#[derive(Debug, Default)]
pub struct Outbox {
    deliveries: Mutex<Vec<Notification>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn deliveries(&self) -> Vec<Notification> {
        self.deliveries.lock().await.clone()
    }

    pub async fn find_to(&self, address: &str) -> Option<Notification> {
        self.deliveries
            .lock()
            .await
            .iter()
            .find(|n| n.to == address)
            .cloned()
    }
}

#[async_trait]
impl Mailer for Outbox {
    async fn send(&self, notification: Notification) -> Result<(), MailError> {
        tracing::info!(
            to = %notification.to,
            subject = %notification.subject,
            "Notification stored in outbox"
        );
        self.deliveries.lock().await.push(notification);
        Ok(())
    }
}
