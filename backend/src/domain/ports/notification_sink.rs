//! Port through which services hand off notifications without waiting.

use crate::domain::TicketNotification;

use super::define_port_error;

define_port_error! {
    /// Errors raised when a notification cannot be queued.
    pub enum NotificationSinkError {
        /// The queue is at capacity.
        QueueFull => "notification queue is full",
        /// The dispatcher has shut down.
        Closed => "notification queue is closed",
    }
}

/// Non-blocking hand-off of ticket notifications.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    /// Queue `notification` for background delivery.
    fn enqueue(&self, notification: TicketNotification) -> Result<(), NotificationSinkError>;
}

/// Sink that discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardNotificationSink;

impl NotificationSink for DiscardNotificationSink {
    fn enqueue(&self, _notification: TicketNotification) -> Result<(), NotificationSinkError> {
        Ok(())
    }
}
