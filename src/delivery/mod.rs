//! Outbound notification delivery.
//!
//! Sending a notification hands it to every configured channel. The only
//! built-in channel writes a structured log line per delivery.

use crate::errors::AppError;
use crate::models::Notification;

/// A transport a sent notification is pushed through.
pub trait DeliveryChannel: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    fn deliver(&self, notification: &Notification) -> Result<(), AppError>;
}

/// Delivers by logging the notification.
#[derive(Debug, Clone, Default)]
pub struct LogChannel;

impl DeliveryChannel for LogChannel {
    fn name(&self) -> &str {
        "log"
    }

    fn deliver(&self, notification: &Notification) -> Result<(), AppError> {
        tracing::info!(
            id = %notification.id,
            title = %notification.title,
            recipients = notification.recipients.as_str(),
            priority = notification.priority.as_str(),
            "notification delivered"
        );
        Ok(())
    }
}
