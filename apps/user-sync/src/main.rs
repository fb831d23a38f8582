mod config;
mod db;
mod errors;
mod models;
mod routes;
mod state;
mod users;
mod webhook;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::routes::build_router;
use crate::state::AppState;
use crate::users::PgUserRepository;
use crate::webhook::signature::WebhookVerifier;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting user-sync v{}", env!("CARGO_PKG_VERSION"));

    // A bad secret must stop the process before any traffic is accepted
    let verifier = WebhookVerifier::new(
        &config.clerk_webhook_secret,
        config.webhook_tolerance_secs,
    )
    .context("CLERK_WEBHOOK_SECRET is not a valid Svix signing secret")?;
    info!(
        "Webhook verifier ready (tolerance: {}s)",
        config.webhook_tolerance_secs
    );

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;

    let state = AppState {
        users: Arc::new(PgUserRepository::new(db)),
        verifier: Arc::new(verifier),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
