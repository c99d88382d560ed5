//! Driving port for ticket reads.

use async_trait::async_trait;

use crate::domain::{AssignmentRecord, Error, TicketId, TicketView, UserId};

/// Driving port for ticket read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketQuery: Send + Sync {
    /// Tickets visible to `caller`, newest first.
    async fn list(&self, caller: UserId) -> Result<Vec<TicketView>, Error>;

    /// A single ticket visible to `caller`.
    async fn get(&self, ticket_id: TicketId, caller: UserId) -> Result<TicketView, Error>;

    /// Assignment history of a ticket visible to `caller`, oldest first.
    async fn assignments(
        &self,
        ticket_id: TicketId,
        caller: UserId,
    ) -> Result<Vec<AssignmentRecord>, Error>;
}
