pub mod admin;
pub mod api;
pub mod config;
pub mod db;
pub mod matching;
pub mod models;
pub mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::state::AppState;

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Install the global tracing subscriber.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Run the API server and the match scheduler until Ctrl-C.
///
/// An unreachable store does not stop the server: the scheduler stays
/// disabled and admin routes answer 503 until the store comes back.
pub async fn run(settings: ServerConfig) -> Result<(), RunError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if let Some(dir) = settings.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::warn!(dir = %dir.display(), error = %e, "Could not create data directory");
        }
    }

    let state = Arc::new(AppState::new(settings.db_path.clone()));

    let scheduler = if settings.scheduler_enabled {
        matching::start_match_scheduler(state.clone(), settings.match_interval)
    } else {
        tracing::info!("Match scheduler disabled by configuration");
        None
    };

    let server = api::start_api_server(state, settings.bind_addr).await?;
    tracing::info!(addr = %server.local_addr(), "Listening");

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Could not listen for shutdown signal");
    }
    tracing::info!("Shutdown requested");

    server.stop().await;
    if let Some(scheduler) = scheduler {
        // Joins the scheduler thread; an in-flight pass finishes first.
        tokio::task::spawn_blocking(move || scheduler.stop())
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?;
    }

    tracing::info!("{} stopped", config::APP_NAME);
    Ok(())
}
