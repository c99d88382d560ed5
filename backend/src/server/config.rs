//! HTTP server configuration object.

use std::net::SocketAddr;

use actix_web::web;
use helpdesk::inbound::http::state::HttpState;
use helpdesk::inbound::ws::state::WsState;

/// Everything the server needs besides the health probe state.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: web::Data<HttpState>,
    pub(crate) ws_state: web::Data<WsState>,
}

impl ServerConfig {
    /// Bundle the bind address with the adapter state shared by workers.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, http_state: HttpState, ws_state: WsState) -> Self {
        Self {
            bind_addr,
            http_state: web::Data::new(http_state),
            ws_state: web::Data::new(ws_state),
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
