//! Helpdesk ticketing backend.
//!
//! The crate is organised as a hexagon: `domain` holds entities, services and
//! the ports they depend on; `inbound` adapts HTTP and WebSocket traffic onto
//! the driving ports; `outbound` implements the driven ports against
//! PostgreSQL, argon2, JWT, an HTTP mail relay and an in-process broadcast
//! hub.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
