// Connection provider - the one place that knows which backend is active.
//
// Everything above this layer asks for a DbConnection and matches on it only
// where the SQL dialects differ.

use super::{
    Backend, BackendSettings, DatabaseConfig, DatabaseError, EmbeddedConnection, RemotePool,
};
use sqlx::mysql::MySql;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqliteConnection;
use tokio::sync::MappedMutexGuard;

/// A scoped connection. Dropping it returns the pool slot or releases the
/// SQLite lock, so it must not be held longer than one operation.
pub enum DbConnection<'a> {
    Remote(PoolConnection<MySql>),
    Embedded(MappedMutexGuard<'a, SqliteConnection>),
}

pub enum ConnectionProvider {
    Remote(RemotePool),
    Embedded(EmbeddedConnection),
}

impl ConnectionProvider {
    /// Build the provider for the configured backend.
    ///
    /// The remote pool is lazy, so an unreachable server surfaces on the first
    /// `acquire`, not here. The embedded file is opened immediately.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        match &config.settings {
            BackendSettings::Remote(remote) => Ok(ConnectionProvider::Remote(
                RemotePool::connect_lazy(
                    remote,
                    config.pool,
                    config.acquire_timeout,
                    config.retry,
                ),
            )),
            BackendSettings::Embedded { path } => Ok(ConnectionProvider::Embedded(
                EmbeddedConnection::open(path, config.acquire_timeout).await?,
            )),
        }
    }

    pub fn backend(&self) -> Backend {
        match self {
            ConnectionProvider::Remote(_) => Backend::Remote,
            ConnectionProvider::Embedded(_) => Backend::Embedded,
        }
    }

    pub async fn acquire(&self) -> Result<DbConnection<'_>, DatabaseError> {
        match self {
            ConnectionProvider::Remote(pool) => pool.acquire().await.map(DbConnection::Remote),
            ConnectionProvider::Embedded(conn) => conn.acquire().await.map(DbConnection::Embedded),
        }
    }

    /// Drain in-flight work, then release every connection. Safe to call
    /// more than once.
    pub async fn shutdown(&self) {
        match self {
            ConnectionProvider::Remote(pool) => pool.close().await,
            ConnectionProvider::Embedded(conn) => conn.close().await,
        }
    }
}
