mod cli;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wanderlust_core::Repository;
use wanderlust_storage::{InMemoryRepository, MongoRepository};
use wanderlust_web::{App, AppState};

use crate::cli::{Cli, StorageBackendArg};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse();

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        "starting wanderlust server"
    );

    match config.storage {
        StorageBackendArg::InMemory => {
            run_server(config.listen_addr, Arc::new(InMemoryRepository::new())).await?;
        }
        StorageBackendArg::Mongodb => {
            let repository = MongoRepository::connect(&config.mongodb_uri, &config.database)
                .await
                .context("failed to connect to mongodb")?;
            info!(database = %config.database, "connected to the database");

            run_server(config.listen_addr, Arc::new(repository.clone())).await?;

            repository.shutdown().await;
            info!("database connection closed");
        }
    }

    Ok(())
}

async fn run_server(listen_addr: SocketAddr, repository: Arc<dyn Repository>) -> anyhow::Result<()> {
    let app = App::router(AppState::new(repository));

    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind {listen_addr}"))?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
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

    info!("shutdown signal received");
}
