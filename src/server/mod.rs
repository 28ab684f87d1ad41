//! HTTP surface: upload page, CSV upload, report download and health check.

pub mod error;
pub mod handlers;
pub mod page;
pub mod routes;

use crate::adapters::LocalStorage;
use crate::config::ServerConfig;
use crate::core::rules::OfficeRules;
use crate::utils::error::Result;
use std::sync::Arc;

pub use routes::{build_router, RouterOptions};

#[derive(Clone)]
pub struct AppState {
    pub storage: LocalStorage,
    pub rules: Arc<OfficeRules>,
}

impl AppState {
    pub fn new(storage: LocalStorage, rules: OfficeRules) -> Self {
        Self {
            storage,
            rules: Arc::new(rules),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
    tracing::info!("Shutdown signal received");
}

/// Binds the configured address and serves until Ctrl-C or SIGTERM.
pub async fn serve(config: &ServerConfig, rules: OfficeRules) -> Result<()> {
    let addr = config.socket_addr()?;
    tokio::fs::create_dir_all(&config.output_dir).await?;

    let state = AppState::new(LocalStorage::new(&config.output_dir), rules);
    let router = build_router(
        state,
        &RouterOptions {
            static_dir: config.static_dir.clone(),
            max_upload_bytes: config.max_upload_bytes(),
        },
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
