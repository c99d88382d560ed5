//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountCommand, AccountQuery, TicketCommand, TicketQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub accounts_query: Arc<dyn AccountQuery>,
    pub tickets: Arc<dyn TicketCommand>,
    pub tickets_query: Arc<dyn TicketQuery>,
}

impl HttpState {
    /// Build state from services that implement both halves of each port pair.
    pub fn from_services<A, T>(accounts: Arc<A>, tickets: Arc<T>) -> Self
    where
        A: AccountCommand + AccountQuery + 'static,
        T: TicketCommand + TicketQuery + 'static,
    {
        Self {
            accounts: accounts.clone(),
            accounts_query: accounts,
            tickets: tickets.clone(),
            tickets_query: tickets,
        }
    }
}
