//! In-process helpdesk server for integration tests.
//!
//! The server runs on an ephemeral port with in-memory storage, real
//! Argon2/JWT adapters, the broadcast hub and a mail transport that records
//! what it was asked to send. Callers must be inside an Actix system (or a
//! Tokio `LocalSet`) because the server spawns local tasks.

use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpServer, web};
use async_trait::async_trait;
use helpdesk::Trace;
use helpdesk::domain::ports::{EmailTransport, EmailTransportError, NotificationSink};
use helpdesk::domain::{
    AccessPolicy, AccountService, DispatcherHandle, NotificationDispatcher,
    NotificationDispatcherPorts, OutboundEmail, TicketService, notification_channel,
};
use helpdesk::inbound::http::state::HttpState;
use helpdesk::inbound::http::{configure_api, json_config};
use helpdesk::inbound::ws;
use helpdesk::inbound::ws::state::{AllowedOrigins, WsState};
use helpdesk::outbound::memory::{MemoryTicketRepository, MemoryUserRepository};
use helpdesk::outbound::realtime::TicketEventHub;
use helpdesk::outbound::security::{Argon2PasswordHasher, JwtTokenService, SigningSecret};
use mockable::DefaultClock;
use url::Url;

/// Origin accepted by the test server's WebSocket endpoint.
pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";

const EMAIL_WAIT: Duration = Duration::from_secs(2);

/// Mail transport that keeps every message it is handed.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<OutboundEmail>>>,
}

impl RecordingMailer {
    /// Messages accepted so far.
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().expect("mailbox lock").clone()
    }

    /// Wait until at least `count` messages arrived or the deadline passes.
    pub async fn wait_for(&self, count: usize) -> Vec<OutboundEmail> {
        let deadline = tokio::time::Instant::now() + EMAIL_WAIT;
        loop {
            let sent = self.sent();
            if sent.len() >= count || tokio::time::Instant::now() >= deadline {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl EmailTransport for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailTransportError> {
        self.sent.lock().expect("mailbox lock").push(email.clone());
        Ok(())
    }
}

/// Running server plus the handles tests inspect.
pub struct TestServer {
    pub base_url: String,
    pub ws_url: String,
    pub mailer: RecordingMailer,
    pub hub: Arc<TicketEventHub>,
    server: ServerHandle,
    dispatcher: DispatcherHandle,
}

impl TestServer {
    /// Stop the listener, then drain the notification queue.
    pub async fn stop(self) {
        self.server.stop(true).await;
        self.dispatcher.shutdown().await;
    }
}

fn http_state(policy: AccessPolicy, notifications: Arc<dyn NotificationSink>) -> HttpState {
    let users = Arc::new(MemoryUserRepository::new());
    let clock = Arc::new(DefaultClock);
    let secret = SigningSecret::ephemeral();
    let accounts = Arc::new(AccountService::new(
        users.clone(),
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(JwtTokenService::new(&secret, chrono::TimeDelta::minutes(10))),
        clock.clone(),
    ));
    let tickets = Arc::new(
        TicketService::new(
            Arc::new(MemoryTicketRepository::new()),
            users,
            notifications,
            clock,
        )
        .with_policy(policy),
    );
    HttpState::from_services(accounts, tickets)
}

/// Start a server with the given access policy.
pub async fn spawn_server(policy: AccessPolicy) -> TestServer {
    let mailer = RecordingMailer::default();
    let hub = Arc::new(TicketEventHub::new());
    let (queue, receiver) = notification_channel(64);
    let dispatcher = NotificationDispatcher::new(NotificationDispatcherPorts {
        mailer: Arc::new(mailer.clone()),
        events: hub.clone(),
    })
    .spawn(receiver);

    let http_data = web::Data::new(http_state(policy, Arc::new(queue)));
    let origins = AllowedOrigins::new([Url::parse(ALLOWED_ORIGIN).expect("origin url")]);
    let ws_data = web::Data::new(WsState::new(hub.clone(), origins));

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener address");
    let server = HttpServer::new(move || {
        App::new()
            .app_data(http_data.clone())
            .app_data(ws_data.clone())
            .app_data(json_config())
            .wrap(Trace)
            .configure(configure_api)
            .service(ws::ws_entry)
    })
    .disable_signals()
    .workers(1)
    .listen(listener)
    .expect("listen")
    .run();

    let handle = server.handle();
    actix_web::rt::spawn(server);

    TestServer {
        base_url: format!("http://{addr}"),
        ws_url: format!("ws://{addr}/ws"),
        mailer,
        hub,
        server: handle,
        dispatcher,
    }
}
