use std::env;

use serde::{Deserialize, Serialize};

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

// ── BigQueryConfig ───────────────────────────────────────────────

/// Configuration for the BigQuery connection.
///
/// Credentials are ambient (Application Default Credentials resolved by the
/// SDK); only the billing project and an optional job location come from the
/// environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BigQueryConfig {
    /// GCP project that query jobs run under. `None` when the environment
    /// names no project; client construction fails in that case.
    pub project_id: Option<String>,
    /// Optional BigQuery location (e.g. "EU") passed when polling jobs.
    pub location: Option<String>,
}

impl BigQueryConfig {
    /// Build config from environment variables.
    ///
    /// `BIGQUERY_PROJECT_ID` is tried first, falling back to
    /// `GOOGLE_CLOUD_PROJECT` (which Cloud Run sets automatically).
    pub fn from_env() -> Self {
        Self {
            project_id: env_opt("BIGQUERY_PROJECT_ID")
                .or_else(|| env_opt("GOOGLE_CLOUD_PROJECT")),
            location: env_opt("BIGQUERY_LOCATION"),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env-based tests must run serially to avoid interfering with each other.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_bigquery_env() {
        for k in [
            "BIGQUERY_PROJECT_ID",
            "GOOGLE_CLOUD_PROJECT",
            "BIGQUERY_LOCATION",
        ] {
            env::remove_var(k);
        }
    }

    #[test]
    fn empty_when_no_env_vars() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_bigquery_env();

        let cfg = BigQueryConfig::from_env();

        assert_eq!(cfg.project_id, None);
        assert_eq!(cfg.location, None);
    }

    #[test]
    fn from_env_reads_vars() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_bigquery_env();

        env::set_var("BIGQUERY_PROJECT_ID", "analytics-prod");
        env::set_var("BIGQUERY_LOCATION", "EU");

        let cfg = BigQueryConfig::from_env();

        assert_eq!(cfg.project_id.as_deref(), Some("analytics-prod"));
        assert_eq!(cfg.location.as_deref(), Some("EU"));

        clear_bigquery_env();
    }

    #[test]
    fn project_falls_back_to_google_cloud_project() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_bigquery_env();

        env::set_var("GOOGLE_CLOUD_PROJECT", "runtime-project");

        let cfg = BigQueryConfig::from_env();
        assert_eq!(cfg.project_id.as_deref(), Some("runtime-project"));

        clear_bigquery_env();
    }

    #[test]
    fn bigquery_project_takes_precedence() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_bigquery_env();

        env::set_var("GOOGLE_CLOUD_PROJECT", "runtime-project");
        env::set_var("BIGQUERY_PROJECT_ID", "explicit-project");

        let cfg = BigQueryConfig::from_env();
        assert_eq!(cfg.project_id.as_deref(), Some("explicit-project"));

        clear_bigquery_env();
    }

    #[test]
    fn empty_strings_are_treated_as_unset() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_bigquery_env();

        env::set_var("BIGQUERY_PROJECT_ID", "");
        env::set_var("GOOGLE_CLOUD_PROJECT", "fallback-project");

        let cfg = BigQueryConfig::from_env();
        assert_eq!(cfg.project_id.as_deref(), Some("fallback-project"));

        clear_bigquery_env();
    }
}
