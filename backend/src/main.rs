//! Helpdesk entry-point: loads settings, wires adapters and runs the server.

mod server;

use std::ffi::OsString;
use std::sync::Arc;

use actix_web::web;
use mockable::{DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use helpdesk::domain::{
    NotificationDispatcher, NotificationDispatcherPorts, notification_channel,
};
use helpdesk::inbound::http::health::HealthState;
use helpdesk::inbound::ws::state::WsState;
use helpdesk::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use helpdesk::outbound::realtime::TicketEventHub;
use helpdesk::outbound::security::{
    Argon2PasswordHasher, BuildMode, JwtTokenService, signing_secret_from_env,
};
use helpdesk::settings::AppSettings;
use server::{ServerConfig, ServiceDeps, build_http_state, build_mailer, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os().collect::<Vec<OsString>>())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let policy = settings.access_policy().map_err(std::io::Error::other)?;
    let origins = settings.allowed_origins().map_err(std::io::Error::other)?;
    let relay = settings.mail_relay().map_err(std::io::Error::other)?;

    let secret = signing_secret_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(fingerprint = %secret.fingerprint(), "token signing secret loaded");

    let pool = match settings.database_url() {
        Some(url) => {
            let applied = run_migrations(url).await.map_err(std::io::Error::other)?;
            info!(applied, "database schema is current");
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(std::io::Error::other)?;
            Some(pool)
        }
        None => None,
    };

    let hub = Arc::new(TicketEventHub::new());
    let (queue, receiver) = notification_channel(settings.notification_queue_capacity());
    let dispatcher = NotificationDispatcher::new(NotificationDispatcherPorts {
        mailer: build_mailer(relay)?,
        events: hub.clone(),
    })
    .spawn(receiver);

    let http_state = build_http_state(
        pool.as_ref(),
        ServiceDeps {
            hasher: Arc::new(Argon2PasswordHasher::new()),
            tokens: Arc::new(JwtTokenService::new(&secret, settings.token_ttl())),
            notifications: Arc::new(queue),
            clock: Arc::new(DefaultClock),
            policy,
        },
    );
    let ws_state = WsState::new(hub, origins);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        ServerConfig::new(bind_addr, http_state, ws_state),
    )?;
    info!(%bind_addr, ?policy, "helpdesk listening");

    let result = server.await;

    health_state.mark_unhealthy();
    // Queued notifications are still delivered after the listener stops.
    dispatcher.shutdown().await;
    result
}
