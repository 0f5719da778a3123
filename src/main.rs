use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use verssion::{
    api,
    config::{Config, StorageBackend},
    fetch::{Fetcher, NotFetcher, WikipediaFetcher},
    storage::{Database, HistoryStore, MemoryStore},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    info!(version = env!("CARGO_PKG_VERSION"), "verssion starting");

    let config = Config::load()?;

    let store: Arc<dyn HistoryStore> = match config.storage.backend {
        StorageBackend::Redb => {
            let db = Database::open(&config.storage.data_dir)?;
            info!("Database opened at: {}", config.storage.data_dir);
            Arc::new(db)
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; history is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let fetcher: Arc<dyn Fetcher> = if config.source.updates {
        let fetcher = WikipediaFetcher::new(
            &config.source.wikipedia_url,
            &config.source.user_agent,
            config.source.timeout,
        )?;
        info!("Fetching pages from: {}", config.source.wikipedia_url);
        Arc::new(fetcher)
    } else {
        Arc::new(NotFetcher)
    };

    let state = Arc::new(AppState::new(config.clone(), fetcher, store));

    let app = api::create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.bind_address).await?;
    info!("Listening on: {}", config.server.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, draining connections");
}
