//! HTTP endpoint modules.
//!
//! Shared response types live here in mod.rs; each sub-module owns one route.

pub mod doc;
mod health;
mod query;

use serde::Serialize;

// ── Shared types ─────────────────────────────────────────────────

/// Error body shared by every failure response: `{"error": "<message>"}`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct QueryErrorResponse {
    pub error: String,
}

// ── Re-exports ───────────────────────────────────────────────────

pub use health::health;
pub use query::execute_query;
