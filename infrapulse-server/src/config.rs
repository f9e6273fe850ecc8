//! Server configuration loaded from the environment.

use std::str::FromStr;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_UI_ORIGINS: &str = "http://127.0.0.1:3000,http://localhost:3000";

/// Which inventory backend the server uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL at the given connection string.
    Postgres(String),
    /// Process-local memory store, lost on restart.
    Memory,
}

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// CORS origins allowed to call the API.
    pub allowed_origins: Vec<String>,
    /// Inventory backend.
    pub store: StoreBackend,
}

impl ServerConfig {
    /// Build the configuration from process environment variables.
    #[cfg_attr(test, allow(dead_code))]
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("INFRAPULSE_HOST")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("INFRAPULSE_PORT") {
            Some(raw) => u16::from_str(raw.trim())
                .map_err(|_| format!("INFRAPULSE_PORT must be a u16 number, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };
        let origins =
            lookup("INFRAPULSE_UI_ORIGINS").unwrap_or_else(|| DEFAULT_UI_ORIGINS.to_string());
        let allowed_origins = origins
            .split(',')
            .map(|value| value.trim())
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        let backend = lookup("INFRAPULSE_STORE").unwrap_or_else(|| "postgres".to_string());
        let store = match backend.trim().to_ascii_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "postgres" | "postgresql" => {
                let url = lookup("DATABASE_URL")
                    .filter(|value| !value.trim().is_empty())
                    .ok_or_else(|| {
                        "DATABASE_URL must be set to a PostgreSQL connection string".to_string()
                    })?;
                StoreBackend::Postgres(url)
            }
            other => return Err(format!("unknown INFRAPULSE_STORE backend: {other}")),
        };

        Ok(Self {
            host,
            port,
            allowed_origins,
            store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ServerConfig, StoreBackend};
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_require_database_url() {
        let err = config(&[]).unwrap_err();
        assert!(err.contains("DATABASE_URL"));

        let config =
            config(&[("DATABASE_URL", "postgres://localhost/infrapulse")]).expect("config");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.allowed_origins,
            vec!["http://127.0.0.1:3000", "http://localhost:3000"]
        );
        assert_eq!(
            config.store,
            StoreBackend::Postgres("postgres://localhost/infrapulse".to_string())
        );
    }

    #[test]
    fn memory_backend_needs_no_database() {
        let config = config(&[
            ("INFRAPULSE_STORE", "Memory"),
            ("INFRAPULSE_HOST", "0.0.0.0"),
            ("INFRAPULSE_PORT", "9000"),
            ("INFRAPULSE_UI_ORIGINS", " https://ops.example.com , ,"),
        ])
        .expect("config");
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.allowed_origins, vec!["https://ops.example.com"]);
    }

    #[test]
    fn rejects_invalid_port_and_backend() {
        let err =
            config(&[("INFRAPULSE_STORE", "memory"), ("INFRAPULSE_PORT", "http")]).unwrap_err();
        assert!(err.contains("INFRAPULSE_PORT"));

        let err = config(&[("INFRAPULSE_STORE", "sqlite")]).unwrap_err();
        assert!(err.contains("sqlite"));
    }
}
