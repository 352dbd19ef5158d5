//! Serves the task workflow API.
//!
//! Usage:
//!
//! ```text
//! taskflow-server [--bind ADDR] [--database-url URL] [--seed-demo-users]
//! ```
//!
//! Without a database URL the server keeps everything in memory and loses it
//! on exit.

use clap::Parser;
use taskflow::{
    config::{ConfigError, ServerConfig},
    http::{AppState, router},
    storage::{self, Repositories, StorageError},
    telemetry,
    user::services::UserDirectoryError,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("logging setup failed: {0}")]
    Telemetry(#[from] tracing_subscriber::util::TryInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("storage setup task failed: {0}")]
    StorageTask(#[from] tokio::task::JoinError),
    #[error("seeding demo users failed: {0}")]
    Seed(#[from] UserDirectoryError),
    #[error("server I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = ServerConfig::parse();
    run(config).await.map_err(Into::into)
}

async fn run(config: ServerConfig) -> Result<(), ServerError> {
    config.validate()?;
    telemetry::init(config.verbose)?;

    let repositories = match config.database_url.clone() {
        Some(url) => {
            let pool_size = config.pool_size;
            let pool = tokio::task::spawn_blocking(move || {
                storage::connect_postgres(&url, pool_size)
            })
            .await??;
            info!(pool_size, "using PostgreSQL storage");
            Repositories::postgres(&pool)
        }
        None => {
            warn!("no database configured, using in-memory storage");
            Repositories::in_memory()
        }
    };

    let state = AppState::from_repositories(
        repositories.tasks,
        repositories.users,
        config.storage_timeout(),
    );
    if config.seed_demo_users {
        let created = state.users().seed_demo_users().await?;
        info!(created = created.len(), "demo users ready");
    }

    let listener = TcpListener::bind(config.bind).await?;
    info!(address = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown requested");
}
