//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod health;
pub mod root;
pub mod state;
pub mod tickets;
pub mod validation;

use actix_web::web;

pub use error::{ApiResult, json_config};

/// Mount the `/api` scope with every account and ticket route.
///
/// Handlers expect [`state::HttpState`] and [`json_config`] to be registered
/// as app data.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(accounts::register)
            .service(accounts::login)
            .service(accounts::current_user)
            .service(tickets::create_ticket)
            .service(tickets::list_tickets)
            .service(tickets::get_ticket)
            .service(tickets::update_ticket)
            .service(tickets::delete_ticket)
            .service(tickets::list_assignments),
    );
}
