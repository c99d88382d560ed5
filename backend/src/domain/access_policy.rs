//! Who may see and modify which tickets.

use std::fmt;
use std::str::FromStr;

use super::{Ticket, UserId};

/// Ticket visibility policy, chosen at deployment time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Users only see and modify tickets they created.
    #[default]
    OwnerOnly,
    /// Every authenticated user sees and modifies every ticket.
    Shared,
}

/// Raised when a policy label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown access policy `{0}`; expected `owner` or `shared`")]
pub struct UnknownAccessPolicy(pub String);

impl AccessPolicy {
    /// Configuration label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OwnerOnly => "owner",
            Self::Shared => "shared",
        }
    }

    /// Creator filter to apply when listing tickets for `requester`.
    ///
    /// # Examples
    /// ```
    /// use helpdesk::domain::{AccessPolicy, UserId};
    ///
    /// let me = UserId::random();
    /// assert_eq!(AccessPolicy::OwnerOnly.list_scope(&me), Some(me));
    /// assert_eq!(AccessPolicy::Shared.list_scope(&me), None);
    /// ```
    pub fn list_scope(self, requester: &UserId) -> Option<UserId> {
        match self {
            Self::OwnerOnly => Some(*requester),
            Self::Shared => None,
        }
    }

    /// Whether `requester` may read or modify `ticket`.
    pub fn permits(self, requester: &UserId, ticket: &Ticket) -> bool {
        match self {
            Self::OwnerOnly => ticket.creator() == requester,
            Self::Shared => true,
        }
    }
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessPolicy {
    type Err = UnknownAccessPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "owner" | "owner-only" | "owner_only" => Ok(Self::OwnerOnly),
            "shared" => Ok(Self::Shared),
            other => Err(UnknownAccessPolicy(other.to_owned())),
        }
    }
}
