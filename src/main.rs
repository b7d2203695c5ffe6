use anyhow::Result;
use chrono::Utc;
use food_share::{
    config::{AppConfig, RunMode},
    routes::routes,
    services::{database::Database, lifecycle_service::LifecycleManager},
    state::AppState,
};
use std::{fs, io::ErrorKind, path::Path};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + run mode ---
    let (cfg, mode) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting food-share with config: {:?}", cfg);

    // --- Ensure the database directory exists ---
    let db_path = cfg
        .database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    tracing::debug!("Interpreted SQLite path => {}", db_path);

    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    // --- Initialize SQLite pools + schema ---
    let db = Database::connect(&cfg.database_url).await?;
    db.migrate().await?;

    match mode {
        RunMode::Migrate => {
            tracing::info!("Database migration complete.");
            db.close().await;
            return Ok(()); // exit after migration
        }
        RunMode::ExpireOverdue => {
            let expired = LifecycleManager::new(db.clone())
                .expire_overdue(Utc::now())
                .await?;
            tracing::info!("Expiry sweep complete: {} donations expired.", expired);
            db.close().await;
            return Ok(());
        }
        RunMode::Serve => {}
    }

    // --- Build router ---
    let app = routes::app(AppState::from_config(db, &cfg));

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
