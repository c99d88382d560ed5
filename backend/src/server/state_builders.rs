//! Builders for HTTP state and outbound adapters.

use std::sync::Arc;
use std::time::Duration;

use helpdesk::domain::ports::{
    EmailTransport, NotificationSink, PasswordHasher, TicketRepository, TokenService,
    UserRepository,
};
use helpdesk::domain::{AccessPolicy, AccountService, EmailAddress, TicketService};
use helpdesk::inbound::http::state::HttpState;
use helpdesk::outbound::mail::{HttpMailRelay, LogOnlyMailer};
use helpdesk::outbound::memory::{MemoryTicketRepository, MemoryUserRepository};
use helpdesk::outbound::persistence::{DbPool, DieselTicketRepository, DieselUserRepository};
use mockable::Clock;
use tracing::info;
use url::Url;

const MAIL_RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Ports shared by both storage back-ends.
#[derive(Clone)]
pub struct ServiceDeps {
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub notifications: Arc<dyn NotificationSink>,
    pub clock: Arc<dyn Clock>,
    pub policy: AccessPolicy,
}

fn http_state_over<U, T>(users: Arc<U>, tickets: Arc<T>, deps: ServiceDeps) -> HttpState
where
    U: UserRepository + 'static,
    T: TicketRepository + 'static,
{
    let ServiceDeps {
        hasher,
        tokens,
        notifications,
        clock,
        policy,
    } = deps;
    let accounts = Arc::new(AccountService::new(
        users.clone(),
        hasher,
        tokens,
        clock.clone(),
    ));
    let tickets =
        Arc::new(TicketService::new(tickets, users, notifications, clock).with_policy(policy));
    HttpState::from_services(accounts, tickets)
}

/// Build HTTP state over PostgreSQL when a pool is available, otherwise over
/// process-local storage.
pub fn build_http_state(pool: Option<&DbPool>, deps: ServiceDeps) -> HttpState {
    match pool {
        Some(pool) => http_state_over(
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselTicketRepository::new(pool.clone())),
            deps,
        ),
        None => {
            info!("no database configured; using in-memory storage");
            http_state_over(
                Arc::new(MemoryUserRepository::new()),
                Arc::new(MemoryTicketRepository::new()),
                deps,
            )
        }
    }
}

/// Build the outbound mailer.
///
/// # Errors
/// Returns [`std::io::Error`] when the HTTP client cannot be constructed.
pub fn build_mailer(
    relay: Option<(Url, EmailAddress)>,
) -> std::io::Result<Arc<dyn EmailTransport>> {
    match relay {
        Some((endpoint, from)) => {
            info!(endpoint = %endpoint, "delivering email through relay");
            let relay = HttpMailRelay::new(endpoint, from, MAIL_RELAY_TIMEOUT)
                .map_err(|err| std::io::Error::other(format!("mail relay client: {err}")))?;
            Ok(Arc::new(relay))
        }
        None => {
            info!("no mail relay configured; outbound email is logged only");
            Ok(Arc::new(LogOnlyMailer))
        }
    }
}
