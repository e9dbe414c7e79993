use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::domain::value_objects::WriteMode;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Where the extract activity reads objects from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlobBackend {
    #[default]
    Azure,
    Local,
}

impl std::str::FromStr for BlobBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "azure" => Ok(BlobBackend::Azure),
            "local" => Ok(BlobBackend::Local),
            _ => Err(format!("Invalid blob backend: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub blob_backend: BlobBackend,
    pub blob_connection_string: Option<String>,
    pub local_blob_root: Option<PathBuf>,
    pub database_url: Option<String>,
    pub blob_fetch_timeout_secs: u64,
    // Database connection pool settings
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub db_write_timeout_secs: u64,
    pub write_mode: WriteMode,
    // Local pipeline runner
    pub pipeline_max_attempts: u32,
    pub pipeline_retry_base_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blob_backend: BlobBackend::default(),
            blob_connection_string: None,
            local_blob_root: None,
            database_url: None,
            blob_fetch_timeout_secs: 60,
            db_max_connections: 5,
            db_acquire_timeout_secs: 10,
            db_write_timeout_secs: 30,
            write_mode: WriteMode::default(),
            pipeline_max_attempts: 3,
            pipeline_retry_base_ms: 500,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            blob_backend: parse_or(&lookup, "BLOB_BACKEND", defaults.blob_backend)?,
            blob_connection_string: non_empty("AzureWebJobsStorage"),
            local_blob_root: non_empty("LOCAL_BLOB_ROOT").map(PathBuf::from),
            database_url: non_empty("SqlConnectionString").or_else(|| non_empty("DATABASE_URL")),
            blob_fetch_timeout_secs: parse_or(
                &lookup,
                "BLOB_FETCH_TIMEOUT_SECS",
                defaults.blob_fetch_timeout_secs,
            )?,
            db_max_connections: parse_or(
                &lookup,
                "DB_MAX_CONNECTIONS",
                defaults.db_max_connections,
            )?,
            db_acquire_timeout_secs: parse_or(
                &lookup,
                "DB_ACQUIRE_TIMEOUT_SECS",
                defaults.db_acquire_timeout_secs,
            )?,
            db_write_timeout_secs: parse_or(
                &lookup,
                "DB_WRITE_TIMEOUT_SECS",
                defaults.db_write_timeout_secs,
            )?,
            write_mode: parse_or(&lookup, "METADATA_WRITE_MODE", defaults.write_mode)?,
            pipeline_max_attempts: parse_or(
                &lookup,
                "PIPELINE_MAX_ATTEMPTS",
                defaults.pipeline_max_attempts,
            )?,
            pipeline_retry_base_ms: parse_or(
                &lookup,
                "PIPELINE_RETRY_BASE_MS",
                defaults.pipeline_retry_base_ms,
            )?,
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(ConfigError::Invalid {
                    key: "SqlConnectionString",
                    reason: "must start with postgres:// or postgresql://".to_string(),
                });
            }
        }

        if self.blob_fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "BLOB_FETCH_TIMEOUT_SECS",
                reason: "must be at least 1 second".to_string(),
            });
        }

        if self.db_write_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "DB_WRITE_TIMEOUT_SECS",
                reason: "must be at least 1 second".to_string(),
            });
        }

        // Acquisition must give up before the write deadline, so an
        // unreachable database surfaces as unavailable rather than a timeout
        if self.db_acquire_timeout_secs >= self.db_write_timeout_secs {
            return Err(ConfigError::Invalid {
                key: "DB_ACQUIRE_TIMEOUT_SECS",
                reason: format!(
                    "must be shorter than DB_WRITE_TIMEOUT_SECS ({}s)",
                    self.db_write_timeout_secs
                ),
            });
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                reason: "must be at least 1".to_string(),
            });
        }

        if self.pipeline_max_attempts == 0 || self.pipeline_max_attempts > 10 {
            return Err(ConfigError::Invalid {
                key: "PIPELINE_MAX_ATTEMPTS",
                reason: "must be between 1 and 10".to_string(),
            });
        }

        Ok(())
    }

    pub fn blob_connection_string(&self) -> Result<&str, ConfigError> {
        self.blob_connection_string
            .as_deref()
            .ok_or(ConfigError::Missing("AzureWebJobsStorage"))
    }

    pub fn local_blob_root(&self) -> Result<&PathBuf, ConfigError> {
        self.local_blob_root
            .as_ref()
            .ok_or(ConfigError::Missing("LOCAL_BLOB_ROOT"))
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("SqlConnectionString"))
    }

    pub fn blob_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.blob_fetch_timeout_secs)
    }

    pub fn db_acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.db_acquire_timeout_secs)
    }

    pub fn db_write_timeout(&self) -> Duration {
        Duration::from_secs(self.db_write_timeout_secs)
    }

    pub fn pipeline_retry_base(&self) -> Duration {
        Duration::from_millis(self.pipeline_retry_base_ms)
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: e.to_string(),
            })
        }
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.blob_backend, BlobBackend::Azure);
        assert_eq!(config.write_mode, WriteMode::Append);
        assert_eq!(config.pipeline_max_attempts, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_connection_strings_are_reported() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(
            config.blob_connection_string(),
            Err(ConfigError::Missing("AzureWebJobsStorage"))
        );
        assert_eq!(
            config.database_url(),
            Err(ConfigError::Missing("SqlConnectionString"))
        );
    }

    #[test]
    fn test_sql_connection_string_takes_precedence() {
        let config = Config::from_lookup(lookup_from(&[
            ("SqlConnectionString", "postgres://a@localhost/one"),
            ("DATABASE_URL", "postgres://b@localhost/two"),
        ]))
        .unwrap();
        assert_eq!(config.database_url().unwrap(), "postgres://a@localhost/one");
    }

    #[test]
    fn test_database_url_fallback() {
        let config =
            Config::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://b@localhost/two")]))
                .unwrap();
        assert_eq!(config.database_url().unwrap(), "postgres://b@localhost/two");
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let config =
            Config::from_lookup(lookup_from(&[("AzureWebJobsStorage", "   ")])).unwrap();
        assert!(config.blob_connection_string().is_err());
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("DB_WRITE_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "DB_WRITE_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn test_write_mode_and_backend_parse() {
        let config = Config::from_lookup(lookup_from(&[
            ("METADATA_WRITE_MODE", "skip-duplicate"),
            ("BLOB_BACKEND", "local"),
            ("LOCAL_BLOB_ROOT", "/srv/blobs"),
        ]))
        .unwrap();
        assert_eq!(config.write_mode, WriteMode::SkipDuplicate);
        assert_eq!(config.blob_backend, BlobBackend::Local);
        assert_eq!(config.local_blob_root().unwrap(), &PathBuf::from("/srv/blobs"));
    }

    #[test]
    fn test_validate_rejects_non_postgres_url() {
        let config = Config {
            database_url: Some("mysql://localhost/db".to_string()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config = Config {
            pipeline_max_attempts: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_acquire_timeout_not_below_write_timeout() {
        for acquire in [30, 45] {
            let config = Config {
                db_acquire_timeout_secs: acquire,
                db_write_timeout_secs: 30,
                ..Config::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::Invalid {
                    key: "DB_ACQUIRE_TIMEOUT_SECS",
                    ..
                })
            ));
        }

        let config = Config {
            db_acquire_timeout_secs: 29,
            db_write_timeout_secs: 30,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parsed_acquire_timeout_above_write_timeout_is_rejected() {
        let config = Config::from_lookup(lookup_from(&[
            ("DB_ACQUIRE_TIMEOUT_SECS", "60"),
            ("DB_WRITE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert!(config.validate().is_err());
    }
}
