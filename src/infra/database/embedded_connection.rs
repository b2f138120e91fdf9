// Single long-lived SQLite connection shared behind an async mutex.
//
// SQLite gets exactly one connection for the whole process. Every caller
// holds the lock for the duration of its statement, so access is serialized.

use super::resilience::with_timeout;
use super::DatabaseError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};

pub struct EmbeddedConnection {
    /// `None` once the connection has been closed.
    conn: Mutex<Option<SqliteConnection>>,
    path: PathBuf,
    acquire_timeout: Duration,
}

impl EmbeddedConnection {
    /// Open (creating if needed) the database file and its parent directory.
    pub async fn open(path: &Path, acquire_timeout: Duration) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| DatabaseError::DataDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .busy_timeout(acquire_timeout);

        let conn = with_timeout("open SQLite database", acquire_timeout, async {
            options
                .connect()
                .await
                .map_err(|source| DatabaseError::Connection {
                    target: path.display().to_string(),
                    source,
                })
        })
        .await?;

        tracing::info!(path = %path.display(), "Opened SQLite database");

        Ok(Self {
            conn: Mutex::new(Some(conn)),
            path: path.to_path_buf(),
            acquire_timeout,
        })
    }

    /// Take the lock on the shared connection.
    ///
    /// Waits at most `acquire_timeout` for the current holder to finish.
    pub async fn acquire(&self) -> Result<MappedMutexGuard<'_, SqliteConnection>, DatabaseError> {
        let guard = with_timeout("wait for SQLite connection", self.acquire_timeout, async {
            Ok(self.conn.lock().await)
        })
        .await?;

        MutexGuard::try_map(guard, |slot| slot.as_mut()).map_err(|_| DatabaseError::Closed)
    }

    /// Wait for the in-flight statement (if any), then close the connection.
    pub async fn close(&self) {
        let mut slot = self.conn.lock().await;
        let Some(conn) = slot.take() else {
            return;
        };

        match conn.close().await {
            Ok(()) => tracing::info!(path = %self.path.display(), "Closed SQLite database"),
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                "Error while closing SQLite database: {}",
                e
            ),
        }
    }
}
