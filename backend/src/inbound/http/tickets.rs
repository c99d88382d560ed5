//! Ticket API handlers.
//!
//! ```text
//! POST /api/tickets {"title":"Printer on fire","description":"Third floor","assignee":"ops@example.com"}
//! GET /api/tickets
//! GET /api/tickets/{id}
//! PUT /api/tickets/{id} {"status":"closed"}
//! DELETE /api/tickets/{id}
//! GET /api/tickets/{id}/assignments
//! ```
//!
//! Every route requires a bearer token. Handlers only check request shape;
//! the ticket service owns validation of field contents.

use actix_web::{delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CreateTicketRequest, TicketRemoved, UpdateTicketRequest};
use crate::domain::{AssignmentRecord, Error, TicketView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_ticket_id, require};

/// Body for `POST /api/tickets`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketBody {
    #[schema(example = "Printer on fire")]
    pub title: Option<String>,
    #[schema(example = "Third floor printer is emitting smoke.")]
    pub description: Option<String>,
    /// Free text; defaults to `open`.
    #[schema(example = "open")]
    pub status: Option<String>,
    /// User id or email address of the assignee.
    #[serde(alias = "assignedToEmail")]
    #[schema(example = "ops@example.com")]
    pub assignee: Option<String>,
}

/// Body for `PUT /api/tickets/{id}`; omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketBody {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(example = "in progress")]
    pub status: Option<String>,
    /// User id or email address of the new assignee.
    #[serde(alias = "assignedToEmail")]
    pub assignee: Option<String>,
}

/// File a new ticket on behalf of the caller.
#[utoipa::path(
    post,
    path = "/api/tickets",
    request_body = CreateTicketBody,
    responses(
        (status = 200, description = "Ticket created", body = TicketView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Assigned user not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "createTicket"
)]
#[post("/tickets")]
pub async fn create_ticket(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateTicketBody>,
) -> ApiResult<web::Json<TicketView>> {
    let body = payload.into_inner();
    let request = CreateTicketRequest {
        creator: caller.id(),
        title: require(body.title, FieldName::new("title"))?,
        description: require(body.description, FieldName::new("description"))?,
        status: body.status,
        assignee: body.assignee,
    };
    let ticket = state.tickets.create(request).await?;
    Ok(web::Json(ticket))
}

/// List tickets visible to the caller, newest first.
#[utoipa::path(
    get,
    path = "/api/tickets",
    responses(
        (status = 200, description = "Tickets", body = [TicketView]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "listTickets"
)]
#[get("/tickets")]
pub async fn list_tickets(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<TicketView>>> {
    let tickets = state.tickets_query.list(caller.id()).await?;
    Ok(web::Json(tickets))
}

/// Fetch a single ticket.
#[utoipa::path(
    get,
    path = "/api/tickets/{id}",
    params(("id" = String, Path, description = "Ticket identifier")),
    responses(
        (status = 200, description = "Ticket", body = TicketView),
        (status = 400, description = "Invalid ticket id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the ticket's creator", body = Error),
        (status = 404, description = "Ticket not found", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "getTicket"
)]
#[get("/tickets/{id}")]
pub async fn get_ticket(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<TicketView>> {
    let ticket_id = parse_ticket_id(&path.into_inner())?;
    let ticket = state.tickets_query.get(ticket_id, caller.id()).await?;
    Ok(web::Json(ticket))
}

/// Merge the supplied fields into a ticket.
#[utoipa::path(
    put,
    path = "/api/tickets/{id}",
    params(("id" = String, Path, description = "Ticket identifier")),
    request_body = UpdateTicketBody,
    responses(
        (status = 200, description = "Updated ticket", body = TicketView),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the ticket's creator", body = Error),
        (status = 404, description = "Ticket or assignee not found", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "updateTicket"
)]
#[put("/tickets/{id}")]
pub async fn update_ticket(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateTicketBody>,
) -> ApiResult<web::Json<TicketView>> {
    let ticket_id = parse_ticket_id(&path.into_inner())?;
    let body = payload.into_inner();
    let request = UpdateTicketRequest {
        ticket_id,
        caller: caller.id(),
        title: body.title,
        description: body.description,
        status: body.status,
        assignee: body.assignee,
    };
    let ticket = state.tickets.update(request).await?;
    Ok(web::Json(ticket))
}

/// Permanently remove a ticket and its assignment history.
#[utoipa::path(
    delete,
    path = "/api/tickets/{id}",
    params(("id" = String, Path, description = "Ticket identifier")),
    responses(
        (status = 200, description = "Ticket removed", body = TicketRemoved),
        (status = 400, description = "Invalid ticket id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the ticket's creator", body = Error),
        (status = 404, description = "Ticket not found", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "deleteTicket"
)]
#[delete("/tickets/{id}")]
pub async fn delete_ticket(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<TicketRemoved>> {
    let ticket_id = parse_ticket_id(&path.into_inner())?;
    let removed = state.tickets.delete(ticket_id, caller.id()).await?;
    Ok(web::Json(removed))
}

/// Assignment history of a ticket, oldest first.
#[utoipa::path(
    get,
    path = "/api/tickets/{id}/assignments",
    params(("id" = String, Path, description = "Ticket identifier")),
    responses(
        (status = 200, description = "Assignment records", body = [AssignmentRecord]),
        (status = 400, description = "Invalid ticket id", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not the ticket's creator", body = Error),
        (status = 404, description = "Ticket not found", body = Error)
    ),
    tags = ["tickets"],
    operation_id = "listTicketAssignments"
)]
#[get("/tickets/{id}/assignments")]
pub async fn list_assignments(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<AssignmentRecord>>> {
    let ticket_id = parse_ticket_id(&path.into_inner())?;
    let records = state
        .tickets_query
        .assignments(ticket_id, caller.id())
        .await?;
    Ok(web::Json(records))
}

#[cfg(test)]
#[path = "tickets_tests.rs"]
mod tests;
