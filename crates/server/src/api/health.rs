//! Liveness endpoint.

use tracing::info;

/// Liveness check
///
/// Always returns `OK`, regardless of whether the BigQuery client is
/// available.
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses((status = 200, description = "Service is running", body = String))
)]
pub async fn health() -> &'static str {
    info!("health check");
    "OK"
}
