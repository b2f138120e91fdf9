// Errors raised by the database layer.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Missing or invalid settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote server could not be reached or the SQLite file could not be opened.
    #[error("Cannot connect to {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    /// The directory holding the SQLite file could not be created.
    #[error("Cannot prepare data directory {}: {source}", path.display())]
    DataDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Schema initialization failed: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("Query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("{operation} timed out after {limit:?}")]
    Timeout {
        operation: &'static str,
        limit: Duration,
    },

    #[error("Database connection is closed")]
    Closed,
}

impl DatabaseError {
    /// True when the backend itself could not be reached (as opposed to a
    /// statement failing on a live connection).
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            DatabaseError::Connection { .. }
                | DatabaseError::DataDirectory { .. }
                | DatabaseError::Timeout { .. }
                | DatabaseError::Closed
        )
    }
}
