//! Framework bootstrap for the matchmaking server runtime: tracing, state
//! wiring, routing, and graceful shutdown. Mirrors the sibling game server's
//! `frameworks::server` so the two binaries read the same at a glance.

use std::io::Result;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use conn_hub::ConnectionHub;

use crate::domain::ports::QueueStore;
use crate::frameworks::config;
use crate::interface_adapters::http;
use crate::interface_adapters::net::ws_handler;
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::stores::{InMemoryMatchesStore, InMemoryQueueStore};
use crate::use_cases::{Matchmaker, MatchmakerConfig, QueueService};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Builds app state and serves on an already-bound listener. Runs until the
/// listener errors or a shutdown signal is received, then aborts the
/// matchmaker ticker before returning.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;

    let hub = Arc::new(ConnectionHub::new());
    let queue_store = Arc::new(InMemoryQueueStore::new());
    let matches_store = Arc::new(InMemoryMatchesStore::new());

    // Store unavailable at startup is fatal (spec §7); the in-memory adapter
    // never fails this, but a real store-backed ping would surface here.
    if let Err(error) = queue_store.ping().await {
        tracing::error!(%error, "queue store unavailable at startup");
        return Err(std::io::Error::other(format!(
            "queue store unavailable at startup: {error}"
        )));
    }

    let cluster = config::cluster_tag();
    if let Some(uri) = config::mongo_uri() {
        tracing::info!(mongo_uri = %uri, cluster = %cluster, "matchmaking store configured");
    } else {
        tracing::info!(cluster = %cluster, "MONGO_URI not set, using in-memory store");
    }

    let queue_service = Arc::new(QueueService::new(
        queue_store.clone(),
        hub.clone(),
        cluster,
    ));
    let matchmaker = Arc::new(Matchmaker::new(
        queue_store,
        matches_store,
        hub.clone(),
        MatchmakerConfig::default(),
    ));
    let ticker = matchmaker.clone().start().await;

    let state = Arc::new(AppState {
        hub,
        queue_service,
        matchmaker,
    });

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/", get(http::root))
        .route("/status", get(http::status))
        .with_state(state);

    tracing::info!(%address, "listening");

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|error| {
            tracing::error!(%error, "server error");
        });

    ticker.abort();
    result
}

pub async fn run_with_config() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|error| {
            tracing::error!(%address, %error, "failed to bind");
        })?;

    run(listener).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
