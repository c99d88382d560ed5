//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST path from the inbound layer, the schemas
//! they reference, and the bearer-token security scheme. The document backs
//! Swagger UI in debug builds and is exported by `cargo run --bin
//! openapi-dump` for external tooling.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::TicketRemoved;
use crate::domain::{AssignmentRecord, Error, ErrorCode, TicketView, UserSummary};
use crate::inbound::http::accounts::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::inbound::http::tickets::{CreateTicketBody, UpdateTicketBody};

/// Name of the bearer security scheme in the generated document.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut bearer = Http::new(HttpAuthScheme::Bearer);
        bearer.bearer_format = Some("JWT".to_owned());
        bearer.description = Some("Token returned by POST /api/auth/login.".to_owned());
        components.add_security_scheme(BEARER_SCHEME, SecurityScheme::Http(bearer));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Helpdesk API",
        description = "Ticket filing, assignment and account endpoints."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::current_user,
        crate::inbound::http::tickets::create_ticket,
        crate::inbound::http::tickets::list_tickets,
        crate::inbound::http::tickets::get_ticket,
        crate::inbound::http::tickets::update_ticket,
        crate::inbound::http::tickets::delete_ticket,
        crate::inbound::http::tickets::list_assignments,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::root::index,
        crate::inbound::ws::ws_entry,
    ),
    components(schemas(
        Error,
        ErrorCode,
        TicketView,
        UserSummary,
        AssignmentRecord,
        TicketRemoved,
        CreateTicketBody,
        UpdateTicketBody,
        RegisterRequest,
        LoginRequest,
        UserResponse,
        AuthResponse
    )),
    tags(
        (name = "auth", description = "Registration, login and the current user"),
        (name = "tickets", description = "Ticket lifecycle and assignment history"),
        (name = "realtime", description = "WebSocket ticket event feed"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
