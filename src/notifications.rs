//! Notifications
//!
//! Short messages for the customer, such as the confirmation shown after adding
//! a product.

use mockall::automock;
use tracing::{info, warn};

/// Severity of a [`Notification`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Something the customer asked for happened.
    Success,

    /// Something the customer asked for failed.
    Error,
}

/// A customer-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,

    /// Text to show
    pub message: String,
}

impl Notification {
    /// Create a success notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    /// Create an error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink for customer-facing notifications.
#[automock]
pub trait Notifier: Send + Sync {
    /// Show a notification.
    fn notify(&self, notification: &Notification);
}

/// Notifier that only emits log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        match notification.level {
            NotificationLevel::Success => info!(message = %notification.message, "notification"),
            NotificationLevel::Error => warn!(message = %notification.message, "notification"),
        }
    }
}
