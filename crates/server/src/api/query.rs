//! Query execution endpoint: accepts SQL, runs it on BigQuery, returns rows.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::{error, info, warn};

use bqgate_bigquery::{BigQueryError, Record};

use crate::state::AppState;

use super::QueryErrorResponse;

/// Longest query prefix that goes to the logs.
const MAX_LOGGED_QUERY_CHARS: usize = 200;

// ── Request types ────────────────────────────────────────────────

#[derive(Deserialize, utoipa::ToSchema)]
pub struct QueryRequest {
    /// SQL text, passed to BigQuery verbatim.
    pub query: String,
}

// ── Handler ──────────────────────────────────────────────────────

/// Execute a SQL query
///
/// Submits the query to BigQuery and blocks until the job completes, then
/// returns every result row as a JSON array of column-name → value objects.
/// There is no client-side timeout: a slow query holds the request open for
/// as long as BigQuery takes, and a disconnecting caller does not cancel the
/// remote job.
#[utoipa::path(
    post,
    path = "/query",
    tag = "Query",
    request_body = QueryRequest,
    responses(
        (status = 200, description = "Result rows in column order", body = Vec<Object>),
        (status = 400, description = "Malformed request body, or BigQuery rejected the query", body = QueryErrorResponse),
        (status = 500, description = "BigQuery client unavailable, or unexpected execution failure", body = QueryErrorResponse)
    )
)]
pub async fn execute_query(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Vec<Record>>, (StatusCode, Json<QueryErrorResponse>)> {
    // Client availability is checked before the body is even parsed; that is
    // why the handler takes raw bytes instead of a Json extractor.
    let Some(client) = state.bigquery.as_ref() else {
        error!("query attempted, but the BigQuery client is not available");
        return Err(error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Server is not configured to connect to BigQuery.".into(),
        ));
    };

    let request: QueryRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(_) => {
            warn!("bad request: body is not JSON with a 'query' key");
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Request body must be JSON with a 'query' key".into(),
            ));
        }
    };

    let logged = truncate_query(&request.query);
    info!(sql = %logged, "executing query");

    match client.execute_query(&request.query).await {
        Ok(records) => {
            info!(records = records.len(), "query succeeded");
            Ok(Json(records))
        }
        Err(BigQueryError::Rejected { message }) => {
            error!(sql = %logged, error = %message, "BigQuery rejected the query");
            Err(error_response(
                StatusCode::BAD_REQUEST,
                format!("BigQuery API error: {message}"),
            ))
        }
        Err(err) => {
            error!(sql = %logged, error = ?err, "unexpected error while executing query");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("An unexpected error occurred: {err}"),
            ))
        }
    }
}

fn error_response(status: StatusCode, error: String) -> (StatusCode, Json<QueryErrorResponse>) {
    (status, Json(QueryErrorResponse { error }))
}

/// First 200 characters of the query for log lines, always ellipsised.
fn truncate_query(sql: &str) -> String {
    let prefix: String = sql.chars().take(MAX_LOGGED_QUERY_CHARS).collect();
    format!("{prefix}...")
}
