use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use supportdesk::app::{build_router, AppState};
use supportdesk::config::{AppConfig, StoreBackend};
use supportdesk::db::repository::{
    ArticleRepository, InMemoryArticleRepository, MongoArticleRepository,
};
use supportdesk::seed;

/// Enterprise iOS support portal API server.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(long, env = "SUPPORTDESK_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "supportdesk=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    tracing::info!("Starting supportdesk server...");

    let config = AppConfig::load(args.config.as_deref())?;

    let article_repo: Arc<dyn ArticleRepository> = match config.store.backend {
        StoreBackend::Mongo => {
            let mongo_client = mongodb::Client::with_uri_str(&config.store.mongodb_uri).await?;
            let mongo_db = mongo_client.database(&config.store.mongodb_database);
            tracing::info!("Connected to MongoDB at {}", config.store.mongodb_uri);
            Arc::new(MongoArticleRepository::new(&mongo_db))
        }
        StoreBackend::Memory => {
            tracing::info!("Using in-memory article store");
            Arc::new(InMemoryArticleRepository::new())
        }
    };

    let knowledge_base = seed::load_knowledge_base(config.store.seed_file.as_deref())?;
    seed::seed_knowledge_base(article_repo.as_ref(), knowledge_base).await?;

    let app = build_router(AppState::new(article_repo), &config)?;

    tracing::info!("Listening on http://{}", config.server.addr);
    let listener = tokio::net::TcpListener::bind(config.server.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
