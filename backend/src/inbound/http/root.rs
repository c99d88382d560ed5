//! Plain-text landing route.

use actix_web::{HttpResponse, get, http::header::ContentType};

/// Greeting returned by `GET /`.
pub const WELCOME_TEXT: &str = "Welcome to the helpdesk API";

/// Confirm the service is reachable without touching any store.
#[utoipa::path(
    get,
    path = "/",
    tags = ["health"],
    security([]),
    responses((status = 200, description = "Welcome text", body = String, content_type = "text/plain"))
)]
#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(WELCOME_TEXT)
}
