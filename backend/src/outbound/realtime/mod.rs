//! In-process real-time hub over a tokio broadcast channel.
//!
//! Each event is serialised once and the resulting text frame is shared by
//! every subscriber. The hub never waits on a slow receiver: once a receiver
//! falls [`EVENT_CHANNEL_CAPACITY`] frames behind it observes `Lagged` and
//! skips ahead.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::TicketEvent;
use crate::domain::ports::{
    TicketEventBus, TicketEventBusError, TicketEventFeed, TicketEventFrame,
};

/// Frames buffered per subscriber before it starts lagging.
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Broadcast hub implementing both sides of the real-time channel.
#[derive(Debug, Clone)]
pub struct TicketEventHub {
    sender: broadcast::Sender<TicketEventFrame>,
}

impl TicketEventHub {
    /// Hub with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CHANNEL_CAPACITY)
    }

    /// Hub buffering `capacity` frames per subscriber; zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TicketEventHub {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketEventBus for TicketEventHub {
    fn publish(&self, event: &TicketEvent) -> Result<usize, TicketEventBusError> {
        let frame: TicketEventFrame = serde_json::to_string(event)
            .map(Arc::from)
            .map_err(|err| TicketEventBusError::encode(err.to_string()))?;
        // `send` only fails when nobody is listening.
        let delivered = self.sender.send(frame).unwrap_or(0);
        debug!(event = event.name(), ticket_id = %event.ticket_id(), delivered, "ticket event published");
        Ok(delivered)
    }
}

impl TicketEventFeed for TicketEventHub {
    fn subscribe(&self) -> broadcast::Receiver<TicketEventFrame> {
        self.sender.subscribe()
    }
}
