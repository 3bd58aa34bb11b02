//! HTTP surface for AuraTasks.
//!
//! # Responsibility
//! - Expose accounts, ordered tasks, goals and the quote proxy as a JSON API.
//! - Own process concerns: configuration, listener, graceful shutdown.
//!
//! # Invariants
//! - Handlers hold no store state; every request opens its own connection.
//! - Business rules live in `auratasks_core`; this crate only maps wire shapes.

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod quote;
pub mod routes;
pub mod state;

use config::Config;
use error::ServerError;
use log::{error, info, warn};
use state::{AppState, SharedState};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;

/// Builds the router for `state`.
pub fn build_router(state: SharedState) -> axum::Router {
    routes::router(state)
}

/// Binds the configured port and serves until SIGINT or SIGTERM.
pub async fn serve(config: Config) -> Result<(), ServerError> {
    if config.uses_dev_secret() {
        warn!("event=config_load module=server status=degraded reason=dev_jwt_secret");
    }

    let state = AppState::new(config)?;
    let address = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let app = build_router(state);

    let listener = TcpListener::bind(address).await?;
    info!("event=server_start module=server status=ok address={address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("event=shutdown_signal module=server status=ok signal=ctrl_c"),
            Err(err) => {
                error!("event=shutdown_signal module=server status=error signal=ctrl_c error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("event=shutdown_signal module=server status=ok signal=terminate");
            }
            Err(err) => {
                error!("event=shutdown_signal module=server status=error signal=terminate error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
