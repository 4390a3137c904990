//! OpenAPI documentation aggregator.
//!
//! Collects the `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single OpenAPI spec, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "bqgate API",
        version = "0.1.0",
        description = "HTTP façade for synchronous BigQuery SQL execution.",
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Query", description = "Synchronous BigQuery SQL execution"),
    ),
    paths(
        crate::api::health::health,
        crate::api::query::execute_query,
    ),
    components(schemas(
        crate::api::QueryErrorResponse,
        crate::api::query::QueryRequest,
    ))
)]
pub struct ApiDoc;
