//! Ticket aggregate and its value types.
//!
//! A ticket stores its assignee as a live [`UserId`] reference. Reads join the
//! referenced user's current name and email into a [`TicketView`]; the
//! point-in-time snapshot taken at assignment lives in [`AssignmentRecord`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{EmailAddress, UserId, UserSummary};

/// Status given to tickets created without one.
pub const DEFAULT_TICKET_STATUS: &str = "open";

/// Validation errors raised by ticket value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketValidationError {
    /// Identifier was not a UUID.
    #[error("ticket id must be a valid UUID")]
    InvalidId,
    /// Title was blank.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Description was blank.
    #[error("description must not be empty")]
    EmptyDescription,
    /// Status was blank.
    #[error("status must not be empty")]
    EmptyStatus,
}

/// Stable ticket identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketId(Uuid);

impl TicketId {
    /// Parse an identifier from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, TicketValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| TicketValidationError::InvalidId)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a UUID read from storage.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TicketId> for String {
    fn from(value: TicketId) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for TicketId {
    type Error = TicketValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Status labels are compared and displayed as keywords, so surrounding
/// whitespace is dropped.
fn trimmed(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_owned()
    }
}

macro_rules! non_blank_text {
    ($(#[$meta:meta])* $name:ident, $empty:ident, $normalise:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Reject blank input and normalise the rest.
            pub fn new(value: impl Into<String>) -> Result<Self, TicketValidationError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(TicketValidationError::$empty);
                }
                Ok(Self($normalise(value)))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = TicketValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

non_blank_text!(
    /// Ticket headline, stored exactly as supplied.
    TicketTitle,
    EmptyTitle,
    std::convert::identity
);
non_blank_text!(
    /// Free-text problem description, stored exactly as supplied.
    TicketDescription,
    EmptyDescription,
    std::convert::identity
);
non_blank_text!(
    /// Free-text workflow status such as `open` or `closed`, trimmed.
    TicketStatus,
    EmptyStatus,
    trimmed
);

impl TicketStatus {
    /// The default `open` status.
    pub fn open() -> Self {
        Self(DEFAULT_TICKET_STATUS.to_owned())
    }

    /// Use `raw` when it has content, otherwise fall back to `open`.
    ///
    /// # Examples
    /// ```
    /// use helpdesk::domain::TicketStatus;
    ///
    /// assert_eq!(TicketStatus::or_open(None).as_ref(), "open");
    /// assert_eq!(TicketStatus::or_open(Some("  ".into())).as_ref(), "open");
    /// assert_eq!(TicketStatus::or_open(Some(" pending ".into())).as_ref(), "pending");
    /// ```
    pub fn or_open(raw: Option<String>) -> Self {
        raw.and_then(|value| Self::new(value).ok())
            .unwrap_or_else(Self::open)
    }
}

/// How a caller names the user a ticket should be assigned to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssigneeRef {
    /// Direct user identifier.
    Id(UserId),
    /// Email address of a registered user.
    Email(EmailAddress),
}

impl AssigneeRef {
    /// Interpret raw input as a UUID first, then as an email address.
    ///
    /// Returns `None` when the input is neither.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if let Ok(id) = UserId::new(trimmed) {
            return Some(Self::Id(id));
        }
        EmailAddress::new(trimmed).ok().map(Self::Email)
    }
}

impl fmt::Display for AssigneeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Email(email) => write!(f, "{email}"),
        }
    }
}

/// Construction input for [`Ticket`].
#[derive(Debug, Clone)]
pub struct TicketDraft {
    /// Identifier.
    pub id: TicketId,
    /// Headline.
    pub title: TicketTitle,
    /// Description.
    pub description: TicketDescription,
    /// Status.
    pub status: TicketStatus,
    /// User who filed the ticket.
    pub creator: UserId,
    /// Current assignee, if any.
    pub assignee: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Persisted support ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    id: TicketId,
    title: TicketTitle,
    description: TicketDescription,
    status: TicketStatus,
    creator: UserId,
    assignee: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TicketDraft> for Ticket {
    fn from(draft: TicketDraft) -> Self {
        let TicketDraft {
            id,
            title,
            description,
            status,
            creator,
            assignee,
            created_at,
            updated_at,
        } = draft;
        Self {
            id,
            title,
            description,
            status,
            creator,
            assignee,
            created_at,
            updated_at,
        }
    }
}

impl Ticket {
    /// Identifier.
    pub fn id(&self) -> TicketId {
        self.id
    }

    /// Headline.
    pub fn title(&self) -> &TicketTitle {
        &self.title
    }

    /// Description.
    pub fn description(&self) -> &TicketDescription {
        &self.description
    }

    /// Status.
    pub fn status(&self) -> &TicketStatus {
        &self.status
    }

    /// User who filed the ticket.
    pub fn creator(&self) -> &UserId {
        &self.creator
    }

    /// Current assignee reference.
    pub fn assignee(&self) -> Option<&UserId> {
        self.assignee.as_ref()
    }

    /// Creation timestamp; never changes.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Timestamp of the last successful update.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Return a copy with `changes` merged in and `updated_at` set to `now`.
    ///
    /// Omitted fields keep their current value.
    #[must_use]
    pub fn with_changes(&self, changes: &TicketChanges, now: DateTime<Utc>) -> Self {
        Self {
            id: self.id,
            title: changes.title.clone().unwrap_or_else(|| self.title.clone()),
            description: changes
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            status: changes.status.clone().unwrap_or_else(|| self.status.clone()),
            creator: self.creator,
            assignee: changes.assignee.or(self.assignee),
            created_at: self.created_at,
            updated_at: now,
        }
    }

    /// Render the ticket with its assignee joined in.
    pub fn into_view(self, assignee: Option<UserSummary>) -> TicketView {
        TicketView {
            id: self.id,
            title: self.title,
            description: self.description,
            status: self.status,
            creator_id: self.creator,
            assignee,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Partial update; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketChanges {
    /// New headline.
    pub title: Option<TicketTitle>,
    /// New description.
    pub description: Option<TicketDescription>,
    /// New status.
    pub status: Option<TicketStatus>,
    /// New assignee.
    pub assignee: Option<UserId>,
}

impl TicketChanges {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.assignee.is_none()
    }
}

/// Ticket read model returned to clients and broadcast to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    /// Identifier.
    #[schema(value_type = String, example = "9b2f7c1e-4d3a-4f5b-8c6d-7e8f9a0b1c2d")]
    pub id: TicketId,
    /// Headline.
    #[schema(value_type = String, example = "Printer on fire")]
    pub title: TicketTitle,
    /// Description.
    #[schema(value_type = String, example = "Third floor printer is emitting smoke.")]
    pub description: TicketDescription,
    /// Status.
    #[schema(value_type = String, example = "open")]
    pub status: TicketStatus,
    /// User who filed the ticket.
    #[schema(value_type = String)]
    pub creator_id: UserId,
    /// Current assignee with live name and email, or `null`.
    pub assignee: Option<UserSummary>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Immutable history entry written whenever a ticket gets an assignee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRecord {
    /// Ticket that was assigned.
    #[schema(value_type = String)]
    pub ticket_id: TicketId,
    /// Assignee identity as it was at assignment time.
    pub assignee: UserSummary,
    /// User who made the assignment.
    #[schema(value_type = String)]
    pub assigned_by: UserId,
    /// When the assignment happened.
    pub assigned_at: DateTime<Utc>,
}
