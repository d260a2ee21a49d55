use std::{env, str::FromStr, time::Duration};

use thiserror::Error;

/// Errors raised while reading configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("STORAGE_BACKEND=postgres requires DATABASE_URL")]
    MissingDatabaseUrl,
}

/// Which repository implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    InMemory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "inmemory" | "memory" => Ok(Self::InMemory),
            _ => Err(ConfigError::InvalidValue {
                key: "STORAGE_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "LOG_FORMAT",
                value: s.to_string(),
            }),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL (default: none)
    pub database_url: Option<String>,
    /// Storage backend (default: postgres when DATABASE_URL is set, else inmemory)
    pub storage_backend: StorageBackend,
    /// Request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,
    /// Log output format (default: pretty)
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DATABASE_URL` - PostgreSQL connection URL
    /// - `STORAGE_BACKEND` - `postgres` or `inmemory`
    /// - `REQUEST_TIMEOUT_SECONDS` - Request timeout in seconds (default: 10)
    /// - `LOG_FORMAT` - `pretty` or `json` (default: pretty)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None if database_url.is_some() => StorageBackend::Postgres,
            None => StorageBackend::InMemory,
        };

        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::MissingDatabaseUrl);
        }

        let request_timeout_seconds = match lookup("REQUEST_TIMEOUT_SECONDS") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "REQUEST_TIMEOUT_SECONDS",
                value,
            })?,
            None => 10,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(value) => value.parse()?,
            None => LogFormat::Pretty,
        };

        Ok(Self {
            database_url,
            storage_backend,
            request_timeout_seconds,
            log_format,
        })
    }

    /// Get the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            storage_backend: StorageBackend::InMemory,
            request_timeout_seconds: 10,
            log_format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = load(&[]).unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.storage_backend, StorageBackend::InMemory);
        assert_eq!(config.request_timeout_seconds, 10);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_database_url_selects_postgres() {
        let config = load(&[("DATABASE_URL", "postgres://postgres@localhost/pg_cdt")]).unwrap();

        assert_eq!(config.storage_backend, StorageBackend::Postgres);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://postgres@localhost/pg_cdt")
        );
    }

    #[test]
    fn test_explicit_inmemory_overrides_database_url() {
        let config = load(&[
            ("DATABASE_URL", "postgres://postgres@localhost/pg_cdt"),
            ("STORAGE_BACKEND", "inmemory"),
        ])
        .unwrap();

        assert_eq!(config.storage_backend, StorageBackend::InMemory);
    }

    #[test]
    fn test_postgres_without_url_is_rejected() {
        let result = load(&[("STORAGE_BACKEND", "postgres")]);

        assert_eq!(result.unwrap_err(), ConfigError::MissingDatabaseUrl);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("STORAGE_BACKEND", "dynamodb")]),
            Err(ConfigError::InvalidValue {
                key: "STORAGE_BACKEND",
                ..
            })
        ));
        assert!(matches!(
            load(&[("REQUEST_TIMEOUT_SECONDS", "soon")]),
            Err(ConfigError::InvalidValue {
                key: "REQUEST_TIMEOUT_SECONDS",
                ..
            })
        ));
        assert!(matches!(
            load(&[("LOG_FORMAT", "xml")]),
            Err(ConfigError::InvalidValue {
                key: "LOG_FORMAT",
                ..
            })
        ));
    }

    #[test]
    fn test_request_timeout_conversion() {
        let config = load(&[("REQUEST_TIMEOUT_SECONDS", "30"), ("LOG_FORMAT", "json")]).unwrap();

        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
