//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities used by the API and persistence
//! layers, plus the services that implement the driving ports. Keep types
//! immutable and document invariants and serialisation contracts in each
//! type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - User, Ticket, TicketView, AssignmentRecord: core data model.
//! - TicketService, AccountService: driving port implementations.
//! - NotificationDispatcher: background email and broadcast delivery.

pub mod access_policy;
pub mod account_service;
pub mod auth;
pub mod error;
pub mod notification;
pub mod notification_dispatcher;
pub mod ports;
pub mod ticket;
pub mod ticket_service;
pub mod trace_id;
pub mod user;

pub use self::access_policy::{AccessPolicy, UnknownAccessPolicy};
pub use self::account_service::AccountService;
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, PASSWORD_MIN_LENGTH, Registration,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::notification::{OutboundEmail, TicketEvent, TicketNotification};
pub use self::notification_dispatcher::{
    DEFAULT_NOTIFICATION_QUEUE_CAPACITY, DispatcherHandle, NotificationDispatcher,
    NotificationDispatcherPorts, NotificationQueue, NotificationReceiver, notification_channel,
};
pub use self::ticket::{
    AssigneeRef, AssignmentRecord, DEFAULT_TICKET_STATUS, Ticket, TicketChanges,
    TicketDescription, TicketDraft, TicketId, TicketStatus, TicketTitle, TicketValidationError,
    TicketView,
};
pub use self::ticket_service::TicketService;
pub use self::trace_id::TraceId;
pub use self::user::{
    EmailAddress, PasswordDigest, Role, USER_NAME_MAX, User, UserAccount, UserId, UserName,
    UserSummary, UserValidationError,
};
