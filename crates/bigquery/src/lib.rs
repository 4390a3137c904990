pub mod config;
pub mod client;
pub mod result;

pub use config::BigQueryConfig;
pub use client::{BigQueryClient, BigQueryError, QueryExecutor};
pub use result::{rows_to_records, Record};
