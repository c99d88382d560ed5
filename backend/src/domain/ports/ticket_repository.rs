//! Port for ticket persistence and assignment history.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AssignmentRecord, Ticket, TicketChanges, TicketId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by ticket repository adapters.
    pub enum TicketRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "ticket repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "ticket repository query failed: {message}",
    }
}

/// Port for reading and writing tickets.
///
/// Adapters apply each mutation atomically: a ticket and its assignment
/// record are written together or not at all.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// Persist a new ticket and, when assigned, its first assignment record.
    async fn insert(
        &self,
        ticket: &Ticket,
        assignment: Option<AssignmentRecord>,
    ) -> Result<(), TicketRepositoryError>;

    /// Find a ticket by id.
    async fn find_by_id(&self, id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError>;

    /// List tickets newest first, optionally restricted to one creator.
    ///
    /// Ties on the creation timestamp are broken by id, descending.
    async fn list(&self, creator: Option<UserId>) -> Result<Vec<Ticket>, TicketRepositoryError>;

    /// Apply only the provided columns and return the updated ticket.
    ///
    /// Returns `None` when the ticket no longer exists.
    async fn update(
        &self,
        id: &TicketId,
        changes: &TicketChanges,
        updated_at: DateTime<Utc>,
        assignment: Option<AssignmentRecord>,
    ) -> Result<Option<Ticket>, TicketRepositoryError>;

    /// Remove a ticket with its assignment history and return what was removed.
    async fn delete(&self, id: &TicketId) -> Result<Option<Ticket>, TicketRepositoryError>;

    /// Assignment history for a ticket, oldest first.
    async fn assignments(
        &self,
        id: &TicketId,
    ) -> Result<Vec<AssignmentRecord>, TicketRepositoryError>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn connection_error_formats_message() {
        let err = TicketRepositoryError::connection("pool exhausted");
        assert_eq!(
            err.to_string(),
            "ticket repository connection failed: pool exhausted"
        );
    }
}
