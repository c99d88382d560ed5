//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`TicketCommand`, `TicketQuery`, `AccountCommand`,
//! `AccountQuery`) are called by inbound adapters. Driven ports are
//! implemented by outbound adapters and injected into the services.

mod macros;
pub(crate) use macros::define_port_error;

mod account_command;
mod account_query;
mod email_transport;
mod notification_sink;
mod password_hasher;
mod ticket_command;
mod ticket_event_bus;
mod ticket_query;
mod ticket_repository;
mod token_service;
mod user_repository;

#[cfg(test)]
pub use account_command::MockAccountCommand;
pub use account_command::{AccountCommand, AuthSession};
#[cfg(test)]
pub use account_query::MockAccountQuery;
pub use account_query::AccountQuery;
#[cfg(test)]
pub use email_transport::MockEmailTransport;
pub use email_transport::{EmailTransport, EmailTransportError};
#[cfg(test)]
pub use notification_sink::MockNotificationSink;
pub use notification_sink::{DiscardNotificationSink, NotificationSink, NotificationSinkError};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHashError, PasswordHasher};
#[cfg(test)]
pub use ticket_command::MockTicketCommand;
pub use ticket_command::{CreateTicketRequest, TicketCommand, TicketRemoved, UpdateTicketRequest};
#[cfg(test)]
pub use ticket_event_bus::MockTicketEventBus;
pub use ticket_event_bus::{
    TicketEventBus, TicketEventBusError, TicketEventFeed, TicketEventFrame,
};
#[cfg(test)]
pub use ticket_query::MockTicketQuery;
pub use ticket_query::TicketQuery;
#[cfg(test)]
pub use ticket_repository::MockTicketRepository;
pub use ticket_repository::{TicketRepository, TicketRepositoryError};
#[cfg(test)]
pub use token_service::MockTokenService;
pub use token_service::{IssuedToken, TokenError, TokenService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
