//! # New World API server
//!
//! ```text
//! client ───► HTTP (3000) ───► routes ───► newworld-db ───► SQLite
//!                                                 ▲
//!                       SuppliesSync (hourly) ────┘
//! ```

use std::net::SocketAddr;

use newworld_api::services::SuppliesSync;
use newworld_api::{build_router, ApiConfig, AppState};
use newworld_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; the real environment still applies
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,newworld=debug,sqlx=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    info!("Starting New World API server...");

    let config = ApiConfig::load()?;
    info!(
        port = config.port,
        db_path = %config.database_path.display(),
        forward_only = config.order_status_forward_only,
        "Configuration loaded"
    );

    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.db_max_connections),
    )
    .await?;
    info!("Database ready");

    let supplies = match &config.supplies_url {
        Some(url) => {
            let (job, handle) =
                SuppliesSync::new(db.clone(), url.clone(), config.supplies_sync_interval)?;
            tokio::spawn(job.run());
            Some(handle)
        }
        None => {
            warn!("SUPPLIES_URL not set, supplies sync disabled");
            None
        }
    };

    let app = build_router(AppState::new(db.clone(), &config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = supplies {
        handle.shutdown().await;
    }
    db.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
