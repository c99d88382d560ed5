//! Driving port for ticket mutations.
//!
//! Requests carry raw client input; the service validates it so every
//! inbound adapter gets the same rules.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Error, TicketId, TicketView, UserId};

/// Request to file a new ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTicketRequest {
    /// Authenticated caller; becomes the creator.
    pub creator: UserId,
    /// Headline; must not be blank.
    pub title: String,
    /// Description; must not be blank.
    pub description: String,
    /// Status; blank or missing means `open`.
    pub status: Option<String>,
    /// Assignee as a user id or email address.
    pub assignee: Option<String>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTicketRequest {
    /// Ticket to change.
    pub ticket_id: TicketId,
    /// Authenticated caller.
    pub caller: UserId,
    /// New headline.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status.
    pub status: Option<String>,
    /// New assignee as a user id or email address.
    pub assignee: Option<String>,
}

/// Confirmation returned after a ticket is removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TicketRemoved {
    /// Fixed confirmation text, `Ticket removed`.
    #[schema(example = "Ticket removed")]
    pub msg: String,
    /// Identifier of the removed ticket.
    #[schema(value_type = String)]
    pub id: TicketId,
}

impl TicketRemoved {
    /// Confirmation for `id`.
    pub fn new(id: TicketId) -> Self {
        Self {
            msg: "Ticket removed".to_owned(),
            id,
        }
    }
}

/// Driving port for ticket write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TicketCommand: Send + Sync {
    /// File a ticket and return it with generated id and timestamps.
    ///
    /// Fails with `invalid_request` on a blank title or description and with
    /// `not_found` when the assignee cannot be resolved. Nothing is persisted
    /// on failure.
    async fn create(&self, request: CreateTicketRequest) -> Result<TicketView, Error>;

    /// Merge the provided fields into an existing ticket.
    async fn update(&self, request: UpdateTicketRequest) -> Result<TicketView, Error>;

    /// Permanently remove a ticket.
    async fn delete(&self, ticket_id: TicketId, caller: UserId) -> Result<TicketRemoved, Error>;
}
