//! Port for fanning ticket events out to real-time subscribers.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::domain::TicketEvent;

use super::define_port_error;

define_port_error! {
    /// Errors raised by event bus adapters.
    pub enum TicketEventBusError {
        /// The event could not be encoded for the wire.
        Encode { message: String } => "ticket event could not be encoded: {message}",
    }
}

/// Publishes ticket events to every connected subscriber.
#[cfg_attr(test, mockall::automock)]
pub trait TicketEventBus: Send + Sync {
    /// Publish `event` and return how many subscribers received it.
    ///
    /// Having no subscribers is not an error.
    fn publish(&self, event: &TicketEvent) -> Result<usize, TicketEventBusError>;
}

/// Pre-encoded JSON text frame shared by every subscriber.
pub type TicketEventFrame = Arc<str>;

/// Subscription side of the real-time channel.
///
/// Each call yields an independent receiver that sees every frame published
/// after it was created. Slow receivers observe `Lagged` and skip ahead.
pub trait TicketEventFeed: Send + Sync {
    /// Open a new subscription.
    fn subscribe(&self) -> broadcast::Receiver<TicketEventFrame>;
}
