//! BigQuery query execution client.
//!
//! Provides [`BigQueryClient`] for executing SQL against BigQuery and
//! blocking until the job completes, with exponential-backoff polling,
//! result paging, and conversion into [`Record`] rows.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use gcp_bigquery_client::error::BQError;
use gcp_bigquery_client::model::get_query_results_parameters::GetQueryResultsParameters;
use gcp_bigquery_client::model::query_request::QueryRequest;
use gcp_bigquery_client::model::table_row::TableRow;
use tracing::{debug, info};

use crate::config::BigQueryConfig;
use crate::result::{rows_to_records, Record};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Errors that can occur during BigQuery operations.
#[derive(Debug, thiserror::Error)]
pub enum BigQueryError {
    /// The client could not be constructed (no project configured, missing
    /// credentials, misconfigured environment).
    #[error("client initialisation failed: {0}")]
    Init(String),

    /// BigQuery understood the call but rejected the query
    /// (syntax error, permissions, quota).
    #[error("BigQuery API error: {message}")]
    Rejected { message: String },

    /// Anything else: transport failures, missing job references, responses
    /// that cannot be interpreted. Displays as the bare message.
    #[error("{0}")]
    Unexpected(String),
}

/// Split SDK failures into "BigQuery rejected the call" vs everything else.
///
/// A structured error body from the service maps to [`BigQueryError::Rejected`]
/// carrying the service's own message text.
fn map_sdk_error(err: BQError) -> BigQueryError {
    match err {
        BQError::ResponseError { error } => BigQueryError::Rejected {
            message: error.error.message,
        },
        other => BigQueryError::Unexpected(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Executes SQL against the warehouse and materialises every result row.
///
/// The one seam between the HTTP layer and the SDK; handler tests substitute
/// a stub implementation.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Submit `sql` for synchronous execution and return all result rows.
    ///
    /// Blocks until the remote job reaches a terminal state. All-or-nothing:
    /// either every row is returned or an error is.
    async fn execute_query(&self, sql: &str) -> Result<Vec<Record>, BigQueryError>;
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for executing queries against BigQuery.
///
/// Wraps the SDK client and adds:
/// - Completion polling with exponential backoff and jitter
/// - Result paging until the full set is in memory
/// - Conversion of REST rows into ordered [`Record`]s
pub struct BigQueryClient {
    project_id: String,
    location: Option<String>,
    inner: gcp_bigquery_client::Client,
}

impl BigQueryClient {
    /// Create a new [`BigQueryClient`] from the given configuration.
    ///
    /// Authenticates via Application Default Credentials. This is attempted
    /// exactly once at process start; callers are expected to treat a failure
    /// as permanent and keep serving without a client.
    pub async fn connect(config: BigQueryConfig) -> Result<Self, BigQueryError> {
        let project_id = config.project_id.ok_or_else(|| {
            BigQueryError::Init(
                "no project configured (set BIGQUERY_PROJECT_ID or GOOGLE_CLOUD_PROJECT)".into(),
            )
        })?;

        let inner = gcp_bigquery_client::Client::from_application_default_credentials()
            .await
            .map_err(|e| BigQueryError::Init(e.to_string()))?;

        info!(project_id = %project_id, "BigQuery client initialised");

        Ok(Self {
            project_id,
            location: config.location,
            inner,
        })
    }
}

#[async_trait]
impl QueryExecutor for BigQueryClient {
    async fn execute_query(&self, sql: &str) -> Result<Vec<Record>, BigQueryError> {
        // 1. Submit. jobs.query waits server-side for a short while, so fast
        // queries come back complete with their first page of rows.
        let response = self
            .inner
            .job()
            .query(&self.project_id, QueryRequest::new(sql))
            .await
            .map_err(map_sdk_error)?;

        let job_id = response
            .job_reference
            .as_ref()
            .and_then(|r| r.job_id.clone());
        let location = response
            .job_reference
            .as_ref()
            .and_then(|r| r.location.clone())
            .or_else(|| self.location.clone());

        let mut schema = response.schema;
        let mut rows: Vec<TableRow> = Vec::new();
        let mut page_token = response.page_token;

        if response.job_complete.unwrap_or(false) {
            if let Some(first_page) = response.rows {
                rows.extend(first_page);
            }
        } else {
            // 2. Still running: poll until the job reaches a terminal state.
            // Failed jobs surface as API errors from getQueryResults. There is
            // deliberately no client-side timeout; a slow query holds the
            // caller for as long as BigQuery takes.
            let job_id = job_id.clone().ok_or_else(|| {
                BigQueryError::Unexpected("query response missing job reference".into())
            })?;

            debug!(job_id = %job_id, "query still running, polling for completion");

            let initial_delay_ms: u64 = 200;
            let max_delay_ms: u64 = 2000;
            let backoff_factor: f64 = 1.5;

            let mut delay_ms = initial_delay_ms;

            loop {
                let results = self
                    .inner
                    .job()
                    .get_query_results(
                        &self.project_id,
                        &job_id,
                        GetQueryResultsParameters {
                            location: location.clone(),
                            ..Default::default()
                        },
                    )
                    .await
                    .map_err(map_sdk_error)?;

                if results.job_complete.unwrap_or(false) {
                    schema = results.schema;
                    if let Some(page) = results.rows {
                        rows.extend(page);
                    }
                    page_token = results.page_token;
                    break;
                }

                // Compute jitter without rand: use the nanosecond fraction of
                // the current time.
                let jitter_ms = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .subsec_nanos() as u64
                    % 100;

                tokio::time::sleep(Duration::from_millis(delay_ms + jitter_ms)).await;

                delay_ms = ((delay_ms as f64 * backoff_factor) as u64).min(max_delay_ms);
            }
        }

        // 3. Remaining pages. Result assembly is all-or-nothing: a paging
        // failure drops everything collected so far.
        while let Some(token) = page_token {
            let job_id = job_id.clone().ok_or_else(|| {
                BigQueryError::Unexpected("paged query response missing job reference".into())
            })?;

            let results = self
                .inner
                .job()
                .get_query_results(
                    &self.project_id,
                    &job_id,
                    GetQueryResultsParameters {
                        location: location.clone(),
                        page_token: Some(token),
                        ..Default::default()
                    },
                )
                .await
                .map_err(map_sdk_error)?;

            if let Some(page) = results.rows {
                rows.extend(page);
            }
            page_token = results.page_token;
        }

        // 4. Reunite schema and rows into ordered records.
        let records = rows_to_records(schema.as_ref(), &rows)?;

        debug!(rows = records.len(), "materialised BigQuery result set");

        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// Tests — no network calls
// ---------------------------------------------------------------------------
