//! Port for delivering outbound email.

use async_trait::async_trait;

use crate::domain::OutboundEmail;

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail transport adapters.
    pub enum EmailTransportError {
        /// The relay could not be reached.
        Transport { message: String } => "mail transport failed: {message}",
        /// The relay answered with a non-success status.
        Rejected { status: u16 } => "mail relay rejected message with status {status}",
    }
}

/// Sends a single email; delivery is attempted once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Hand `email` to the transport.
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailTransportError>;
}
