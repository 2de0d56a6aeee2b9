// ABOUTME: Entry point for the travel-cms binary.
// ABOUTME: Loads configuration, initializes tracing, opens the store, and serves the HTTP API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use cms_server::{AppState, CmsConfig, StoreBackend, create_router};

/// Command line arguments. Each flag overrides its CMS_* environment variable.
#[derive(Parser, Debug)]
#[command(name = "travel-cms")]
#[command(about = "Content-management API for itineraries, travelogues, and trip plans")]
struct Args {
    /// Address to listen on
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Storage backend: sqlite or memory
    #[arg(long, value_name = "BACKEND")]
    store: Option<StoreBackend>,

    /// SQLite database file
    #[arg(long, value_name = "PATH")]
    db_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "travel_cms=debug,cms_server=debug,cms_store=debug,tower_http=debug",
                )
            }),
        )
        .init();

    let args = Args::parse();
    let mut config = CmsConfig::from_env()?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(store) = args.store {
        config.store = store;
    }
    if let Some(db_path) = args.db_path {
        config.db_path = db_path;
    }

    let store = config.open_store()?;
    let state = Arc::new(AppState::new(store));
    tracing::info!(
        bind = %config.bind,
        backend = state.backend_name(),
        "travel-cms starting up"
    );

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("travel-cms stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
