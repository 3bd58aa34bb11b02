//! Shared application state and the per-request store bridge.
//!
//! # Invariants
//! - No connection outlives one request; each store call opens its own on the blocking pool.
//! - The schema is migrated once at startup, before the first request.

use crate::config::Config;
use crate::error::{ApiError, ServerError};
use crate::quote::QuoteClient;
use auratasks_core::db::open_db;
use auratasks_core::TokenIssuer;
use log::{error, info};
use rusqlite::Connection;
use std::sync::Arc;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub tokens: TokenIssuer,
    pub quotes: QuoteClient,
}

impl AppState {
    /// Builds state from `config` and brings the store schema up to date.
    pub fn new(config: Config) -> Result<SharedState, ServerError> {
        drop(open_db(&config.db_path)?);
        info!(
            "event=store_ready module=server status=ok path={}",
            config.db_path.display()
        );

        let tokens = TokenIssuer::new(config.jwt_secret.as_bytes(), config.token_ttl);
        let quotes = QuoteClient::new(config.quote_url.clone(), config.quote_timeout)?;
        Ok(Arc::new(Self {
            config,
            tokens,
            quotes,
        }))
    }

    /// Runs `work` against a fresh store connection on the blocking pool.
    pub async fn with_store<T, F>(&self, work: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
    {
        let path = self.config.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = open_db(&path)?;
            work(&conn)
        })
        .await
        .map_err(|err| {
            error!("event=store_task module=server status=error error={err}");
            ApiError::Internal
        })?
    }
}
