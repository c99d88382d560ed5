//! WebSocket inbound adapter streaming ticket events to browsers.
//!
//! Responsibilities:
//! - validate upgrade requests against the configured origin allow-list
//! - spawn one session task per connection fed by the ticket event feed
//! - keep WebSocket-specific concerns at the edge of the system

use actix_web::web::{self, Payload};
use actix_web::{
    HttpRequest, HttpResponse, get,
    http::header::{HeaderValue, ORIGIN},
};
use tracing::{debug, error, warn};
use url::Url;

mod session;

pub mod state;

use state::{AllowedOrigins, WsState};

/// Handle WebSocket upgrade for the `/ws` endpoint.
#[utoipa::path(
    get,
    path = "/ws",
    tags = ["realtime"],
    security([]),
    responses(
        (status = 101, description = "Switching protocols; ticket events follow as JSON text frames"),
        (status = 400, description = "Missing, malformed or repeated Origin header"),
        (status = 403, description = "Origin not allowed")
    )
)]
#[get("/ws")]
pub async fn ws_entry(
    state: web::Data<WsState>,
    req: HttpRequest,
    stream: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("Missing Origin header on WebSocket upgrade");
        actix_web::error::ErrorBadRequest("Missing Origin header")
    })?;
    if origin_iter.next().is_some() {
        error!("Multiple Origin headers on WebSocket upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }

    validate_origin(&state.origins, origin_header)?;

    let (response, session, messages) = actix_ws::handle(&req, stream).map_err(|error| {
        error!(error = %error, "WebSocket upgrade failed");
        actix_web::error::ErrorInternalServerError("WebSocket upgrade failed")
    })?;
    let events = state.feed.subscribe();
    debug!("WebSocket subscriber attached");
    actix_web::rt::spawn(session::handle_ws_session(events, session, messages));
    Ok(response)
}

fn validate_origin(allowed: &AllowedOrigins, origin_header: &HeaderValue) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "Failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    let origin = Url::parse(origin_value).map_err(|error| {
        error!(error = %error, "Failed to parse Origin header as URL");
        actix_web::error::ErrorBadRequest("Invalid Origin header")
    })?;

    if allowed.permits(&origin) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "Rejected WS upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use rstest::{fixture, rstest};

    #[fixture]
    fn allowed() -> AllowedOrigins {
        AllowedOrigins::parse(["http://localhost:3000"]).expect("origins parse")
    }

    fn status_of(error: &actix_web::Error) -> StatusCode {
        error.as_response_error().status_code()
    }

    #[rstest]
    fn accepts_configured_origin(allowed: AllowedOrigins) {
        let header = HeaderValue::from_static("http://localhost:3000");
        assert!(validate_origin(&allowed, &header).is_ok());
    }

    #[rstest]
    #[case("http://localhost:3001")]
    #[case("https://example.com")]
    fn rejects_disallowed_origins(allowed: AllowedOrigins, #[case] origin: &str) {
        let header = HeaderValue::from_str(origin).expect("valid header value");
        let error = validate_origin(&allowed, &header).expect_err("origin should be rejected");
        assert_eq!(status_of(&error), StatusCode::FORBIDDEN);
    }

    #[rstest]
    fn rejects_non_utf8_origin_header(allowed: AllowedOrigins) {
        let header = HeaderValue::from_bytes(&[0x80]).expect("opaque header value");
        let error = validate_origin(&allowed, &header).expect_err("origin should be rejected");
        assert_eq!(status_of(&error), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    fn rejects_unparsable_origin_header(allowed: AllowedOrigins) {
        let header = HeaderValue::from_static("not a url");
        let error = validate_origin(&allowed, &header).expect_err("origin should be rejected");
        assert_eq!(status_of(&error), StatusCode::BAD_REQUEST);
    }
}
