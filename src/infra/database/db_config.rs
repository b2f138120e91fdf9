// Database configuration read from the environment (.env is loaded in main).

use super::{Backend, DatabaseError, RetryPolicy};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// File name of the embedded database inside the data directory.
pub const EMBEDDED_DB_FILE: &str = "data.db";

/// Credentials and address of the MySQL server.
#[derive(Clone)]
pub struct RemoteSettings {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl RemoteSettings {
    /// `host:port/database`, used in log lines and errors. Never includes credentials.
    pub fn target(&self) -> String {
        format!("{}:{}/{}", self.host, self.port, self.database)
    }
}

impl std::fmt::Debug for RemoteSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Backend-specific part of the configuration.
#[derive(Debug, Clone)]
pub enum BackendSettings {
    Remote(RemoteSettings),
    Embedded { path: PathBuf },
}

/// Bounds of the remote connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub settings: BackendSettings,
    pub pool: PoolSettings,
    /// Per-attempt bound on getting a connection (pool checkout or SQLite lock).
    pub acquire_timeout: Duration,
    /// Bound on every individual statement.
    pub statement_timeout: Duration,
    pub retry: RetryPolicy,
}

impl DatabaseConfig {
    /// Embedded configuration with default limits, storing `data.db` in `data_dir`.
    #[allow(dead_code)]
    pub fn embedded(data_dir: impl Into<PathBuf>) -> Self {
        Self::with_settings(BackendSettings::Embedded {
            path: data_dir.into().join(EMBEDDED_DB_FILE),
        })
    }

    /// Remote configuration with default limits.
    #[allow(dead_code)]
    pub fn remote(settings: RemoteSettings) -> Self {
        Self::with_settings(BackendSettings::Remote(settings))
    }

    fn with_settings(settings: BackendSettings) -> Self {
        Self {
            settings,
            pool: PoolSettings::default(),
            acquire_timeout: Duration::from_secs(5),
            statement_timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
        }
    }

    pub fn backend(&self) -> Backend {
        match self.settings {
            BackendSettings::Remote(_) => Backend::Remote,
            BackendSettings::Embedded { .. } => Backend::Embedded,
        }
    }

    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, DatabaseError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve keys, so tests never touch the real environment.
    ///
    /// Empty values count as unset, except `DB_PASSWORD` which may be blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DatabaseError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = Backend::select(get("DB_TYPE").as_deref());
        let settings = match backend {
            Backend::Remote => {
                let require = |key: &str| {
                    get(key).ok_or_else(|| {
                        DatabaseError::Config(format!("{} is required when DB_TYPE=mysql", key))
                    })
                };
                BackendSettings::Remote(RemoteSettings {
                    host: require("DB_HOST")?,
                    port: parse_or("DB_PORT", get("DB_PORT"), 3306u16)?,
                    database: require("DB_NAME")?,
                    user: require("DB_USER")?,
                    password: lookup("DB_PASSWORD").ok_or_else(|| {
                        DatabaseError::Config(
                            "DB_PASSWORD is required when DB_TYPE=mysql".to_string(),
                        )
                    })?,
                })
            }
            Backend::Embedded => {
                let data_dir = get("DATA_DIR").unwrap_or_else(|| "data".to_string());
                BackendSettings::Embedded {
                    path: PathBuf::from(data_dir).join(EMBEDDED_DB_FILE),
                }
            }
        };

        let defaults = PoolSettings::default();
        let pool = PoolSettings {
            max_connections: parse_or(
                "DB_MAX_CONNECTIONS",
                get("DB_MAX_CONNECTIONS"),
                defaults.max_connections,
            )?,
            min_connections: parse_or(
                "DB_MIN_CONNECTIONS",
                get("DB_MIN_CONNECTIONS"),
                defaults.min_connections,
            )?,
        };
        if pool.max_connections == 0 {
            return Err(DatabaseError::Config(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }
        if pool.min_connections > pool.max_connections {
            return Err(DatabaseError::Config(format!(
                "DB_MIN_CONNECTIONS ({}) exceeds DB_MAX_CONNECTIONS ({})",
                pool.min_connections, pool.max_connections
            )));
        }

        let acquire_secs = parse_or(
            "DB_ACQUIRE_TIMEOUT_SECS",
            get("DB_ACQUIRE_TIMEOUT_SECS"),
            5u64,
        )?;
        let statement_secs = parse_or(
            "DB_STATEMENT_TIMEOUT_SECS",
            get("DB_STATEMENT_TIMEOUT_SECS"),
            5u64,
        )?;
        if acquire_secs == 0 || statement_secs == 0 {
            return Err(DatabaseError::Config(
                "database timeouts must be at least 1 second".to_string(),
            ));
        }

        let retry = RetryPolicy {
            max_attempts: parse_or(
                "DB_CONNECT_RETRIES",
                get("DB_CONNECT_RETRIES"),
                RetryPolicy::default().max_attempts,
            )?,
            ..RetryPolicy::default()
        };

        Ok(Self {
            settings,
            pool,
            acquire_timeout: Duration::from_secs(acquire_secs),
            statement_timeout: Duration::from_secs(statement_secs),
            retry,
        })
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, DatabaseError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| DatabaseError::Config(format!("{} has an invalid value: {:?}", key, value))),
        None => Ok(default),
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
        move |key: &str| map.get(key).cloned()
    }

    fn remote_pairs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DB_TYPE", "MySQL"),
            ("DB_HOST", "db.internal"),
            ("DB_NAME", "crown"),
            ("DB_USER", "crown"),
            ("DB_PASSWORD", "hunter2"),
        ]
    }

    #[test]
    fn test_defaults_to_embedded() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config.backend(), Backend::Embedded);
        match config.settings {
            BackendSettings::Embedded { path } => {
                assert_eq!(path, PathBuf::from("data").join("data.db"))
            }
            other => panic!("unexpected settings: {:?}", other),
        }
        assert_eq!(config.pool, PoolSettings::default());
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
        assert_eq!(config.statement_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_embedded_ignores_remote_credentials() {
        let config = DatabaseConfig::from_lookup(lookup_from(&[
            ("DB_TYPE", "sqlite"),
            ("DATA_DIR", "/var/lib/crown"),
        ]))
        .unwrap();

        match config.settings {
            BackendSettings::Embedded { path } => {
                assert_eq!(path, PathBuf::from("/var/lib/crown/data.db"))
            }
            other => panic!("unexpected settings: {:?}", other),
        }
    }

    #[test]
    fn test_remote_settings() {
        let mut pairs = remote_pairs();
        pairs.push(("DB_PORT", "3307"));
        pairs.push(("DB_CONNECT_RETRIES", "5"));
        let config = DatabaseConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.backend(), Backend::Remote);
        assert_eq!(config.retry.max_attempts, 5);
        match config.settings {
            BackendSettings::Remote(remote) => {
                assert_eq!(remote.port, 3307);
                assert_eq!(remote.target(), "db.internal:3307/crown");
                assert!(!format!("{:?}", remote).contains("hunter2"));
            }
            other => panic!("unexpected settings: {:?}", other),
        }
    }

    #[test]
    fn test_remote_port_defaults_and_blank_password_is_allowed() {
        let mut pairs = remote_pairs();
        pairs.retain(|(k, _)| *k != "DB_PASSWORD");
        pairs.push(("DB_PASSWORD", ""));
        let config = DatabaseConfig::from_lookup(lookup_from(&pairs)).unwrap();

        match config.settings {
            BackendSettings::Remote(remote) => {
                assert_eq!(remote.port, 3306);
                assert_eq!(remote.password, "");
            }
            other => panic!("unexpected settings: {:?}", other),
        }
    }

    #[test]
    fn test_remote_requires_credentials() {
        for missing in ["DB_HOST", "DB_NAME", "DB_USER", "DB_PASSWORD"] {
            let mut pairs = remote_pairs();
            pairs.retain(|(k, _)| *k != missing);
            let err = DatabaseConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
            match err {
                DatabaseError::Config(msg) => assert!(msg.contains(missing), "{}", msg),
                other => panic!("expected config error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_invalid_numbers_are_config_errors() {
        let mut pairs = remote_pairs();
        pairs.push(("DB_PORT", "eighty"));
        assert!(matches!(
            DatabaseConfig::from_lookup(lookup_from(&pairs)),
            Err(DatabaseError::Config(_))
        ));

        assert!(matches!(
            DatabaseConfig::from_lookup(lookup_from(&[
                ("DB_MIN_CONNECTIONS", "8"),
                ("DB_MAX_CONNECTIONS", "4"),
            ])),
            Err(DatabaseError::Config(_))
        ));

        assert!(matches!(
            DatabaseConfig::from_lookup(lookup_from(&[("DB_STATEMENT_TIMEOUT_SECS", "0")])),
            Err(DatabaseError::Config(_))
        ));
    }
}
