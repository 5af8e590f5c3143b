mod auth;
mod catalog;
mod config;
mod db;
mod dealers;
mod errors;
mod models;
mod reviews;
mod routes;
mod state;
mod upstream;

#[cfg(test)]
mod testutils;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{extract::Request, ServiceExt};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{PgUserStore, RedisSessionStore};
use crate::catalog::{CatalogStore, PgCatalogRepo};
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_app;
use crate::state::AppState;
use crate::upstream::UpstreamClient;

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

    info!("Starting Dealership API v{}", env!("CARGO_PKG_VERSION"));

    // Upstream services
    let upstream = UpstreamClient::new(&config.upstream)?;
    info!("Dealer backend: {}", config.upstream.backend_url);
    if !config.upstream.fallback_urls.is_empty() {
        info!("Fallback backends: {:?}", config.upstream.fallback_urls);
    }
    info!("Sentiment analyzer: {}", config.upstream.sentiment_url);

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!("Redis client initialized");

    let state = AppState {
        backend: Arc::new(upstream),
        catalog: Arc::new(CatalogStore::new(Arc::new(PgCatalogRepo::new(db.clone())))),
        sessions: Arc::new(RedisSessionStore::new(redis, config.session_ttl_secs)),
        users: Arc::new(PgUserStore::new(db)),
    };

    let app = build_app(state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
}
