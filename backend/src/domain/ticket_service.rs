//! Ticket domain service.
//!
//! Implements the ticket driving ports: validates client input, resolves
//! assignee references, enforces the configured [`AccessPolicy`], writes
//! through the ticket repository, and hands a notification to the sink after
//! every successful mutation. Notification hand-off never fails a call.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    CreateTicketRequest, NotificationSink, TicketCommand, TicketQuery, TicketRemoved,
    TicketRepository, TicketRepositoryError, UpdateTicketRequest, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    AccessPolicy, AssigneeRef, AssignmentRecord, EmailAddress, Error, OutboundEmail, Ticket,
    TicketChanges, TicketDescription, TicketDraft, TicketEvent, TicketId, TicketNotification,
    TicketStatus, TicketTitle, TicketValidationError, TicketView, User, UserId, UserSummary,
};

fn map_ticket_error(error: TicketRepositoryError) -> Error {
    match error {
        TicketRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("ticket repository unavailable: {message}"))
        }
        TicketRepositoryError::Query { message } => {
            Error::internal(format!("ticket repository error: {message}"))
        }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::internal(format!("unexpected duplicate email during lookup: {email}"))
        }
    }
}

fn field_error(field: &'static str, error: TicketValidationError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": field,
        "code": "empty_field",
    }))
}

fn ticket_not_found(ticket_id: TicketId) -> Error {
    Error::not_found("Ticket not found").with_details(json!({
        "ticketId": ticket_id,
        "code": "ticket_not_found",
    }))
}

fn assignee_not_found(reference: &str) -> Error {
    Error::not_found("Assigned user not found").with_details(json!({
        "field": "assignee",
        "value": reference,
        "code": "assignee_not_found",
    }))
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

/// Ticket service implementing [`TicketCommand`] and [`TicketQuery`].
#[derive(Clone)]
pub struct TicketService<T, U> {
    tickets: Arc<T>,
    users: Arc<U>,
    notifications: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    policy: AccessPolicy,
}

impl<T, U> TicketService<T, U> {
    /// Create a service using the default owner-only policy.
    pub fn new(
        tickets: Arc<T>,
        users: Arc<U>,
        notifications: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tickets,
            users,
            notifications,
            clock,
            policy: AccessPolicy::default(),
        }
    }

    /// Replace the access policy.
    #[must_use]
    pub fn with_policy(mut self, policy: AccessPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The access policy in force.
    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }
}

impl<T, U> TicketService<T, U>
where
    T: TicketRepository,
    U: UserRepository,
{
    async fn resolve_assignee(&self, raw: &str) -> Result<User, Error> {
        let Some(reference) = AssigneeRef::parse(raw) else {
            return Err(assignee_not_found(raw));
        };
        let found = match &reference {
            AssigneeRef::Id(id) => self.users.find_by_id(id).await,
            AssigneeRef::Email(email) => self
                .users
                .find_by_email(email)
                .await
                .map(|account| account.map(|found| found.user)),
        }
        .map_err(map_user_error)?;
        found.ok_or_else(|| assignee_not_found(raw))
    }

    async fn load_visible(&self, ticket_id: TicketId, caller: &UserId) -> Result<Ticket, Error> {
        let ticket = self
            .tickets
            .find_by_id(&ticket_id)
            .await
            .map_err(map_ticket_error)?
            .ok_or_else(|| ticket_not_found(ticket_id))?;
        if !self.policy.permits(caller, &ticket) {
            debug!(%ticket_id, %caller, policy = %self.policy, "ticket access denied");
            return Err(Error::forbidden("User not authorized"));
        }
        Ok(ticket)
    }

    async fn assignee_summary(&self, assignee: Option<&UserId>) -> Result<Option<UserSummary>, Error> {
        let Some(id) = assignee else {
            return Ok(None);
        };
        let user = self.users.find_by_id(id).await.map_err(map_user_error)?;
        Ok(user.as_ref().map(User::summary))
    }

    async fn render_many(&self, tickets: Vec<Ticket>) -> Result<Vec<TicketView>, Error> {
        let ids: Vec<UserId> = tickets
            .iter()
            .filter_map(|ticket| ticket.assignee().copied())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let assignees: HashMap<UserId, UserSummary> = if ids.is_empty() {
            HashMap::new()
        } else {
            self.users
                .find_many_by_ids(&ids)
                .await
                .map_err(map_user_error)?
                .iter()
                .map(|user| (*user.id(), user.summary()))
                .collect()
        };
        Ok(tickets
            .into_iter()
            .map(|ticket| {
                let assignee = ticket.assignee().and_then(|id| assignees.get(id)).cloned();
                ticket.into_view(assignee)
            })
            .collect())
    }

    /// Email of a ticket creator; lookup failures only skip the email.
    async fn creator_email(&self, creator: &UserId) -> Option<EmailAddress> {
        match self.users.find_by_id(creator).await {
            Ok(Some(user)) => Some(user.email().clone()),
            Ok(None) => {
                debug!(%creator, "ticket creator no longer exists; skipping email");
                None
            }
            Err(err) => {
                warn!(%creator, error = %err, "creator lookup failed; skipping email");
                None
            }
        }
    }

    fn notify(&self, event: TicketEvent, email: Option<OutboundEmail>) {
        let name = event.name();
        let ticket_id = event.ticket_id();
        if let Err(err) = self
            .notifications
            .enqueue(TicketNotification::new(event, email))
        {
            warn!(event = name, %ticket_id, error = %err, "ticket notification dropped");
        }
    }
}

#[async_trait]
impl<T, U> TicketCommand for TicketService<T, U>
where
    T: TicketRepository,
    U: UserRepository,
{
    async fn create(&self, request: CreateTicketRequest) -> Result<TicketView, Error> {
        let title = TicketTitle::new(request.title).map_err(|err| field_error("title", err))?;
        let description = TicketDescription::new(request.description)
            .map_err(|err| field_error("description", err))?;
        let status = TicketStatus::or_open(request.status);
        let assignee = match present(request.assignee.as_deref()) {
            Some(raw) => Some(self.resolve_assignee(raw).await?),
            None => None,
        };

        let now = self.clock.utc();
        let ticket = Ticket::from(TicketDraft {
            id: TicketId::random(),
            title,
            description,
            status,
            creator: request.creator,
            assignee: assignee.as_ref().map(|user| *user.id()),
            created_at: now,
            updated_at: now,
        });
        let record = assignee.as_ref().map(|user| AssignmentRecord {
            ticket_id: ticket.id(),
            assignee: user.summary(),
            assigned_by: request.creator,
            assigned_at: now,
        });
        self.tickets
            .insert(&ticket, record)
            .await
            .map_err(map_ticket_error)?;
        info!(ticket_id = %ticket.id(), creator = %request.creator, "ticket created");

        let email = match &assignee {
            Some(user) => Some(OutboundEmail::assigned_on_create(
                user.email().clone(),
                ticket.title().as_ref(),
            )),
            None => self
                .creator_email(&request.creator)
                .await
                .map(|to| OutboundEmail::created(to, ticket.title().as_ref())),
        };
        let view = ticket.into_view(assignee.as_ref().map(User::summary));
        self.notify(
            TicketEvent::Created {
                ticket: view.clone(),
            },
            email,
        );
        Ok(view)
    }

    async fn update(&self, request: UpdateTicketRequest) -> Result<TicketView, Error> {
        let mut changes = TicketChanges {
            title: request
                .title
                .map(TicketTitle::new)
                .transpose()
                .map_err(|err| field_error("title", err))?,
            description: request
                .description
                .map(TicketDescription::new)
                .transpose()
                .map_err(|err| field_error("description", err))?,
            status: request
                .status
                .map(TicketStatus::new)
                .transpose()
                .map_err(|err| field_error("status", err))?,
            assignee: None,
        };

        let existing = self.load_visible(request.ticket_id, &request.caller).await?;
        let new_assignee = match present(request.assignee.as_deref()) {
            Some(raw) => {
                let user = self.resolve_assignee(raw).await?;
                (existing.assignee() != Some(user.id())).then_some(user)
            }
            None => None,
        };
        changes.assignee = new_assignee.as_ref().map(|user| *user.id());

        let now = self.clock.utc();
        let record = new_assignee.as_ref().map(|user| AssignmentRecord {
            ticket_id: existing.id(),
            assignee: user.summary(),
            assigned_by: request.caller,
            assigned_at: now,
        });
        let updated = self
            .tickets
            .update(&request.ticket_id, &changes, now, record)
            .await
            .map_err(map_ticket_error)?
            .ok_or_else(|| ticket_not_found(request.ticket_id))?;
        info!(
            ticket_id = %updated.id(),
            caller = %request.caller,
            reassigned = new_assignee.is_some(),
            "ticket updated"
        );

        let assignee = match &new_assignee {
            Some(user) => Some(user.summary()),
            None => self.assignee_summary(updated.assignee()).await?,
        };
        let email = new_assignee.as_ref().map(|user| {
            OutboundEmail::assigned_on_update(user.email().clone(), updated.title().as_ref())
        });
        let view = updated.into_view(assignee);
        self.notify(
            TicketEvent::Updated {
                ticket: view.clone(),
            },
            email,
        );
        Ok(view)
    }

    async fn delete(&self, ticket_id: TicketId, caller: UserId) -> Result<TicketRemoved, Error> {
        self.load_visible(ticket_id, &caller).await?;
        let removed = self
            .tickets
            .delete(&ticket_id)
            .await
            .map_err(map_ticket_error)?
            .ok_or_else(|| ticket_not_found(ticket_id))?;
        info!(%ticket_id, %caller, "ticket deleted");

        let email = self
            .creator_email(removed.creator())
            .await
            .map(|to| OutboundEmail::deleted(to, removed.title().as_ref()));
        self.notify(
            TicketEvent::Deleted {
                ticket_id,
                title: removed.title().clone(),
            },
            email,
        );
        Ok(TicketRemoved::new(ticket_id))
    }
}

#[async_trait]
impl<T, U> TicketQuery for TicketService<T, U>
where
    T: TicketRepository,
    U: UserRepository,
{
    async fn list(&self, caller: UserId) -> Result<Vec<TicketView>, Error> {
        let tickets = self
            .tickets
            .list(self.policy.list_scope(&caller))
            .await
            .map_err(map_ticket_error)?;
        self.render_many(tickets).await
    }

    async fn get(&self, ticket_id: TicketId, caller: UserId) -> Result<TicketView, Error> {
        let ticket = self.load_visible(ticket_id, &caller).await?;
        let assignee = self.assignee_summary(ticket.assignee()).await?;
        Ok(ticket.into_view(assignee))
    }

    async fn assignments(
        &self,
        ticket_id: TicketId,
        caller: UserId,
    ) -> Result<Vec<AssignmentRecord>, Error> {
        self.load_visible(ticket_id, &caller).await?;
        self.tickets
            .assignments(&ticket_id)
            .await
            .map_err(map_ticket_error)
    }
}

#[cfg(test)]
#[path = "ticket_service_tests.rs"]
mod tests;
