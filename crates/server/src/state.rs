use std::sync::Arc;

use bqgate_bigquery::QueryExecutor;

/// Process-wide shared state.
///
/// The client handle is written exactly once at startup and never mutated.
/// `None` means initialisation failed; every query request gets a 500 until
/// the process is restarted. Read-only sharing means no locking is needed.
pub struct AppState {
    pub bigquery: Option<Arc<dyn QueryExecutor>>,
}
