//! Store configuration.
//!
//! Loaded from environment variables with fallback to defaults.
//!
//! | Variable                 | Default      | Meaning                    |
//! |--------------------------|--------------|----------------------------|
//! | `POS_REPOSITORY_KIND`    | `memory`     | `memory` or `sqlite`       |
//! | `POS_DATABASE_PATH`      | `./tally.db` | SQLite file (sqlite only)  |
//! | `POS_DB_MAX_CONNECTIONS` | `5`          | Pool size (sqlite only)    |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::pool::DbConfig;

const REPOSITORY_KIND: &str = "POS_REPOSITORY_KIND";
const DATABASE_PATH: &str = "POS_DATABASE_PATH";
const MAX_CONNECTIONS: &str = "POS_DB_MAX_CONNECTIONS";

/// Which storage backs the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Sqlite,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" | "in-memory" => Ok(Backend::Memory),
            "sqlite" => Ok(Backend::Sqlite),
            _ => Err(ConfigError::InvalidValue(REPOSITORY_KIND.to_string())),
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Storage backend
    pub backend: Backend,

    /// SQLite database file
    pub database_path: PathBuf,

    /// SQLite pool size
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            backend: Backend::Memory,
            database_path: PathBuf::from("./tally.db"),
            max_connections: 5,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StoreConfig::default();

        let config = StoreConfig {
            backend: match lookup(REPOSITORY_KIND) {
                Some(kind) => kind.parse()?,
                None => defaults.backend,
            },

            database_path: lookup(DATABASE_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: match lookup(MAX_CONNECTIONS) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(MAX_CONNECTIONS.to_string()))?,
                None => defaults.max_connections,
            },
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(MAX_CONNECTIONS.to_string()));
        }

        Ok(config)
    }

    /// Pool settings for the SQLite backend.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
