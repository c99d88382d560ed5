//! Ticket lifecycle notifications.
//!
//! The ticket service builds one [`TicketNotification`] per successful
//! mutation and hands it to a [`NotificationSink`](super::ports::NotificationSink).
//! The dispatcher turns it into at most one email and exactly one real-time
//! [`TicketEvent`].

use serde::Serialize;

use super::{EmailAddress, TicketId, TicketTitle, TicketView, TraceId};

/// Plain-text email addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    /// Recipient.
    pub to: EmailAddress,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub text: String,
}

impl OutboundEmail {
    /// Email sent to the assignee of a freshly created ticket.
    ///
    /// # Examples
    /// ```
    /// use helpdesk::domain::{EmailAddress, OutboundEmail};
    ///
    /// let to = EmailAddress::new("agent@example.com").expect("email");
    /// let email = OutboundEmail::assigned_on_create(to, "Printer jam");
    /// assert_eq!(email.subject, "New Ticket Assigned");
    /// assert_eq!(
    ///     email.text,
    ///     "A new ticket with title \"Printer jam\" has been assigned to you."
    /// );
    /// ```
    pub fn assigned_on_create(to: EmailAddress, title: &str) -> Self {
        Self {
            to,
            subject: "New Ticket Assigned".to_owned(),
            text: format!("A new ticket with title \"{title}\" has been assigned to you."),
        }
    }

    /// Confirmation sent to the creator of an unassigned ticket.
    pub fn created(to: EmailAddress, title: &str) -> Self {
        Self {
            to,
            subject: "Ticket Created".to_owned(),
            text: format!("Your ticket with title \"{title}\" has been created."),
        }
    }

    /// Email sent to a newly assigned user when a ticket changes hands.
    pub fn assigned_on_update(to: EmailAddress, title: &str) -> Self {
        Self {
            to,
            subject: "Ticket Updated and Assigned".to_owned(),
            text: format!("A ticket with title \"{title}\" has been assigned to you."),
        }
    }

    /// Email sent to the creator after their ticket was deleted.
    pub fn deleted(to: EmailAddress, title: &str) -> Self {
        Self {
            to,
            subject: "Ticket Deleted".to_owned(),
            text: format!("Your ticket with title \"{title}\" has been deleted."),
        }
    }
}

/// Real-time event pushed to WebSocket subscribers.
///
/// Serialises as an internally tagged object, e.g.
/// `{"event":"ticketDeleted","ticketId":"…","title":"…"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum TicketEvent {
    /// A ticket was filed.
    #[serde(rename = "ticketCreated")]
    Created {
        /// Ticket as returned to the creator.
        ticket: TicketView,
    },
    /// A ticket changed.
    #[serde(rename = "ticketUpdated")]
    Updated {
        /// Ticket after the update.
        ticket: TicketView,
    },
    /// A ticket was removed.
    #[serde(rename = "ticketDeleted")]
    Deleted {
        /// Identifier of the removed ticket.
        #[serde(rename = "ticketId")]
        ticket_id: TicketId,
        /// Title of the removed ticket.
        title: TicketTitle,
    },
}

impl TicketEvent {
    /// Wire name of the event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "ticketCreated",
            Self::Updated { .. } => "ticketUpdated",
            Self::Deleted { .. } => "ticketDeleted",
        }
    }

    /// Identifier of the affected ticket.
    pub fn ticket_id(&self) -> TicketId {
        match self {
            Self::Created { ticket } | Self::Updated { ticket } => ticket.id,
            Self::Deleted { ticket_id, .. } => *ticket_id,
        }
    }
}

/// Work item queued for the notification dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketNotification {
    /// Trace of the request that caused the notification.
    pub trace_id: Option<TraceId>,
    /// Email to send first, if any.
    pub email: Option<OutboundEmail>,
    /// Event to broadcast.
    pub event: TicketEvent,
}

impl TicketNotification {
    /// Build a notification, capturing the trace identifier in scope.
    pub fn new(event: TicketEvent, email: Option<OutboundEmail>) -> Self {
        Self {
            trace_id: TraceId::current(),
            email,
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Ticket, TicketDescription, TicketDraft, TicketStatus, UserId,
    };
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::json;

    const TICKET_ID: &str = "0b1c2d3e-4f50-4a6b-8c7d-9e0f1a2b3c4d";

    fn view() -> TicketView {
        let at = Utc
            .with_ymd_and_hms(2026, 1, 2, 3, 4, 5)
            .single()
            .expect("timestamp");
        Ticket::from(TicketDraft {
            id: TicketId::new(TICKET_ID).expect("ticket id"),
            title: TicketTitle::new("Issue with login").expect("title"),
            description: TicketDescription::new("Unable to login").expect("description"),
            status: TicketStatus::open(),
            creator: UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("creator"),
            assignee: None,
            created_at: at,
            updated_at: at,
        })
        .into_view(None)
    }

    #[rstest]
    fn created_event_wraps_ticket() {
        let event = TicketEvent::Created { ticket: view() };
        let value = serde_json::to_value(&event).expect("serialise");
        assert_eq!(value["event"], json!("ticketCreated"));
        assert_eq!(value["ticket"]["title"], json!("Issue with login"));
        assert_eq!(value["ticket"]["status"], json!("open"));
    }

    #[rstest]
    fn deleted_event_carries_id_and_title() {
        let event = TicketEvent::Deleted {
            ticket_id: TicketId::new(TICKET_ID).expect("ticket id"),
            title: TicketTitle::new("Issue with login").expect("title"),
        };
        let value = serde_json::to_value(&event).expect("serialise");
        assert_eq!(
            value,
            json!({
                "event": "ticketDeleted",
                "ticketId": TICKET_ID,
                "title": "Issue with login",
            })
        );
        assert_eq!(event.name(), "ticketDeleted");
    }

    #[rstest]
    fn deletion_email_names_the_ticket() {
        let to = EmailAddress::new("ada@example.com").expect("email");
        let email = OutboundEmail::deleted(to, "Issue with login");
        assert_eq!(email.subject, "Ticket Deleted");
        assert_eq!(
            email.text,
            "Your ticket with title \"Issue with login\" has been deleted."
        );
    }

    #[rstest]
    #[tokio::test]
    async fn notification_captures_trace_in_scope() {
        let trace_id = TraceId::generate();
        let notification = TraceId::scope(trace_id, async {
            TicketNotification::new(TicketEvent::Updated { ticket: view() }, None)
        })
        .await;
        assert_eq!(notification.trace_id, Some(trace_id));
    }
}
