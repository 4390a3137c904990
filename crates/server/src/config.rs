//! Server configuration from the environment.

use std::env;

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `SERVER_PORT` wins over `PORT` (the latter is what Cloud Run sets).
    pub fn from_env() -> Self {
        let port = env_opt("SERVER_PORT")
            .or_else(|| env_opt("PORT"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);

        Self {
            host: env_or("SERVER_HOST", "0.0.0.0"),
            port,
        }
    }
}
