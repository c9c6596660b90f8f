//! Framework bootstrap for the game server runtime: tracing, state wiring,
//! routing, and graceful shutdown. Mirrors the sibling matchmaking server's
//! `frameworks::server` so the two binaries read the same at a glance.

use std::io::Result;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use conn_hub::ConnectionHub;

use crate::domain::CardSource;
use crate::frameworks::config;
use crate::interface_adapters::card_source::FileCardSource;
use crate::interface_adapters::http;
use crate::interface_adapters::net::ws_handler;
use crate::interface_adapters::state::AppState;
use crate::use_cases::{RoomRegistry, RoomService};

fn init_runtime() {
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
/// listener errors or a shutdown signal is received (spec §5: SIGINT/SIGTERM
/// stops the process; rooms do not persist, so in-flight games are simply
/// dropped with it).
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let address = listener.local_addr()?;

    let catalog_path = config::card_catalog_path();
    let card_source = Arc::new(FileCardSource::new(catalog_path.clone()));
    // Store unavailable at startup is fatal (spec §7); for this crate the
    // analogous fatal startup check is the card catalog failing to load.
    if let Err(error) = card_source.catalog() {
        tracing::error!(path = %catalog_path.display(), ?error, "card catalog unavailable at startup");
        return Err(std::io::Error::other(format!(
            "card catalog unavailable at startup: {error:?}"
        )));
    }

    let hub = Arc::new(ConnectionHub::new());
    let registry = Arc::new(RoomRegistry::new());
    let room_service = Arc::new(RoomService::new(hub.clone(), registry, card_source));

    let state = Arc::new(AppState { hub, room_service });

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/", get(http::root))
        .with_state(state);

    tracing::info!(%address, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|error| {
            tracing::error!(%error, "server error");
        })
}

pub async fn run_with_config() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_runtime();

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
