mod api;
mod config;
mod router;
mod state;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bqgate_bigquery::{BigQueryClient, BigQueryConfig, QueryExecutor};

use crate::config::ServerConfig;
use crate::state::AppState;

/// Log filter from `LOGLEVEL` (the deployment's knob, case-insensitive),
/// falling back to `RUST_LOG`, then "info".
fn init_tracing() {
    let filter = std::env::var("LOGLEVEL")
        .ok()
        .filter(|s| !s.is_empty())
        .map(|level| EnvFilter::new(level.to_lowercase()))
        .unwrap_or_else(|| {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // One construction attempt at process start. An empty holder is permanent
    // until restart; requests get a 500 instead of the process crashing.
    let bigquery: Option<Arc<dyn QueryExecutor>> =
        match BigQueryClient::connect(BigQueryConfig::from_env()).await {
            Ok(client) => {
                info!("BigQuery client initialized successfully");
                Some(Arc::new(client))
            }
            Err(e) => {
                error!(error = ?e, "could not initialize BigQuery client — POST /query will return 500");
                None
            }
        };

    let state = Arc::new(AppState { bigquery });
    let app = router::build_router(state);

    let config = ServerConfig::from_env();
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
