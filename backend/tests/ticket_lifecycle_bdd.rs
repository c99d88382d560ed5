//! Behaviour tests for the ticket lifecycle over real HTTP.
//!
//! Each scenario starts its own in-memory server, registers users through the
//! public API and drives tickets with bearer tokens.
//
// rstest-bdd generates guard variables with double underscores, which trips
// the non_snake_case lint under -D warnings.
#![allow(non_snake_case)]

// The harness exposes more handles than each suite inspects.
#[allow(dead_code)]
#[path = "support/helpdesk_server.rs"]
mod helpdesk_server;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use actix_web::http::Method;
use awc::Client;
use helpdesk::domain::{AccessPolicy, TRACE_ID_HEADER};
use helpdesk_server::{TestServer, spawn_server};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use tokio::runtime::Runtime;
use tokio::task::LocalSet;

struct LifecycleWorld {
    runtime: Runtime,
    local: LocalSet,
    server: Option<TestServer>,
    tokens: HashMap<String, String>,
    ticket_id: Option<String>,
    ticket_owner: Option<String>,
    last_status: Option<u16>,
    last_body: Option<Value>,
    last_trace_id: Option<String>,
}

struct WorldFixture {
    world: Rc<RefCell<LifecycleWorld>>,
}

impl Drop for WorldFixture {
    fn drop(&mut self) {
        let mut ctx = self.world.borrow_mut();
        if let Some(server) = ctx.server.take() {
            ctx.local.block_on(&ctx.runtime, server.stop());
        }
    }
}

#[fixture]
fn world() -> WorldFixture {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime");
    WorldFixture {
        world: Rc::new(RefCell::new(LifecycleWorld {
            runtime,
            local: LocalSet::new(),
            server: None,
            tokens: HashMap::new(),
            ticket_id: None,
            ticket_owner: None,
            last_status: None,
            last_body: None,
            last_trace_id: None,
        })),
    }
}

struct Exchange {
    status: u16,
    trace_id: Option<String>,
    body: Value,
}

fn exchange(
    world: &WorldFixture,
    method: Method,
    path: &str,
    token: Option<String>,
    payload: Option<Value>,
) -> Exchange {
    let ctx = world.world.borrow();
    let base_url = ctx.server.as_ref().expect("server started").base_url.clone();
    let url = format!("{base_url}{path}");
    ctx.local.block_on(&ctx.runtime, async move {
        let mut request = Client::default().request(method, url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let mut response = match payload {
            Some(payload) => request.send_json(&payload).await,
            None => request.send().await,
        }
        .expect("http request");
        let trace_id = response
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let bytes = response.body().await.expect("response body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Exchange {
            status: response.status().as_u16(),
            trace_id,
            body,
        }
    })
}

fn record(world: &WorldFixture, exchange: Exchange) {
    let mut ctx = world.world.borrow_mut();
    ctx.last_status = Some(exchange.status);
    ctx.last_trace_id = exchange.trace_id;
    ctx.last_body = Some(exchange.body);
}

fn token_for(world: &WorldFixture, email: &str) -> String {
    world
        .world
        .borrow()
        .tokens
        .get(email)
        .cloned()
        .unwrap_or_else(|| panic!("{email} is not registered"))
}

fn ticket_path(world: &WorldFixture) -> String {
    let id = world.world.borrow().ticket_id.clone().expect("ticket filed");
    format!("/api/tickets/{id}")
}

fn file_ticket(world: &WorldFixture, email: &str, assignee: Option<&str>) -> Exchange {
    let mut payload = json!({
        "title": "Printer on fire",
        "description": "Third floor printer is emitting smoke."
    });
    if let Some(assignee) = assignee {
        payload["assignee"] = json!(assignee);
    }
    let filed = exchange(
        world,
        Method::POST,
        "/api/tickets",
        Some(token_for(world, email)),
        Some(payload),
    );
    let mut ctx = world.world.borrow_mut();
    ctx.ticket_id = filed.body["id"].as_str().map(str::to_owned);
    ctx.ticket_owner = Some(email.to_owned());
    drop(ctx);
    filed
}

#[given("a running helpdesk with the {policy} policy")]
fn a_running_helpdesk(world: &WorldFixture, policy: String) {
    let policy: AccessPolicy = policy.parse().expect("known policy");
    let mut ctx = world.world.borrow_mut();
    let server = ctx.local.block_on(&ctx.runtime, spawn_server(policy));
    ctx.server = Some(server);
}

#[given("a registered user {email}")]
fn a_registered_user(world: &WorldFixture, email: String) {
    let registered = exchange(
        world,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Helpdesk User",
            "email": email,
            "password": "correct horse"
        })),
    );
    assert_eq!(registered.status, 200, "registration of {email}");
    let token = registered.body["token"].as_str().expect("token").to_owned();
    world.world.borrow_mut().tokens.insert(email, token);
}

#[given("{email} has filed a ticket")]
fn has_filed_a_ticket(world: &WorldFixture, email: String) {
    let filed = file_ticket(world, &email, None);
    assert_eq!(filed.status, 200);
}

#[when("{email} files a ticket assigned to {assignee}")]
fn files_a_ticket_assigned_to(world: &WorldFixture, email: String, assignee: String) {
    let filed = file_ticket(world, &email, Some(&assignee));
    record(world, filed);
}

#[when("{email} fetches that ticket")]
fn fetches_that_ticket(world: &WorldFixture, email: String) {
    let path = ticket_path(world);
    let fetched = exchange(world, Method::GET, &path, Some(token_for(world, &email)), None);
    record(world, fetched);
}

#[when("{email} deletes that ticket")]
fn deletes_that_ticket(world: &WorldFixture, email: String) {
    let path = ticket_path(world);
    let deleted = exchange(
        world,
        Method::DELETE,
        &path,
        Some(token_for(world, &email)),
        None,
    );
    record(world, deleted);
}

#[when("an anonymous client lists tickets")]
fn an_anonymous_client_lists_tickets(world: &WorldFixture) {
    let listed = exchange(world, Method::GET, "/api/tickets", None, None);
    record(world, listed);
}

#[then("the response status is {status}")]
fn the_response_status_is(world: &WorldFixture, status: u16) {
    assert_eq!(world.world.borrow().last_status, Some(status));
}

#[then("the ticket is assigned to {email}")]
fn the_ticket_is_assigned_to(world: &WorldFixture, email: String) {
    let ctx = world.world.borrow();
    let body = ctx.last_body.as_ref().expect("ticket body");
    assert_eq!(body["assignee"]["email"], email.as_str());
}

#[then("{email} receives an email with subject {subject}")]
fn receives_an_email(world: &WorldFixture, email: String, subject: String) {
    let ctx = world.world.borrow();
    let mailer = ctx.server.as_ref().expect("server started").mailer.clone();
    let sent = ctx.local.block_on(&ctx.runtime, mailer.wait_for(1));
    assert!(
        sent.iter()
            .any(|message| message.to.as_ref() == email && message.subject == subject),
        "no `{subject}` email to {email} in {sent:?}"
    );
}

#[then("the assignment history names {email}")]
fn the_assignment_history_names(world: &WorldFixture, email: String) {
    let path = format!("{}/assignments", ticket_path(world));
    let owner = world.world.borrow().ticket_owner.clone().expect("ticket owner");
    let history = exchange(world, Method::GET, &path, Some(token_for(world, &owner)), None);
    let records = history.body.as_array().expect("assignment array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["assignee"]["email"], email.as_str());
}

#[then("fetching that ticket as {email} returns {status}")]
fn fetching_that_ticket_returns(world: &WorldFixture, email: String, status: u16) {
    let path = ticket_path(world);
    let fetched = exchange(world, Method::GET, &path, Some(token_for(world, &email)), None);
    assert_eq!(fetched.status, status);
}

#[then("the response is unauthorised with a trace id")]
fn the_response_is_unauthorised_with_a_trace_id(world: &WorldFixture) {
    let ctx = world.world.borrow();
    assert_eq!(ctx.last_status, Some(401));
    let trace_id = ctx.last_trace_id.as_deref().expect("trace id header");
    let body = ctx.last_body.as_ref().expect("error body");
    assert_eq!(body.get("traceId").and_then(Value::as_str), Some(trace_id));
}

#[scenario(
    path = "tests/features/ticket_lifecycle.feature",
    name = "Filing a ticket assigned to a colleague"
)]
fn filing_a_ticket_assigned_to_a_colleague(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/ticket_lifecycle.feature",
    name = "Tickets stay private under the owner policy"
)]
fn tickets_stay_private_under_the_owner_policy(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/ticket_lifecycle.feature",
    name = "Tickets are visible to everyone under the shared policy"
)]
fn tickets_are_visible_under_the_shared_policy(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/ticket_lifecycle.feature",
    name = "Deleted tickets are gone"
)]
fn deleted_tickets_are_gone(world: WorldFixture) {
    drop(world);
}

#[scenario(
    path = "tests/features/ticket_lifecycle.feature",
    name = "Requests without a token are rejected"
)]
fn requests_without_a_token_are_rejected(world: WorldFixture) {
    drop(world);
}
