// MySQL connection pool with health checks and an explicit retry policy

use super::resilience::with_timeout;
use super::{DatabaseError, PoolSettings, RemoteSettings, RetryPolicy};
use sqlx::mysql::{MySql, MySqlConnectOptions, MySqlPool, MySqlPoolOptions, MySqlSslMode};
use sqlx::pool::PoolConnection;
use std::time::Duration;

/// Prepared statements cached per connection.
const STATEMENT_CACHE_CAPACITY: usize = 250;

pub struct RemotePool {
    pool: MySqlPool,
    target: String,
    acquire_timeout: Duration,
    retry: RetryPolicy,
}

impl RemotePool {
    /// Build the pool without touching the network. Connections are opened on
    /// first checkout and the pool then keeps `min_connections` warm.
    pub fn connect_lazy(
        settings: &RemoteSettings,
        limits: PoolSettings,
        acquire_timeout: Duration,
        retry: RetryPolicy,
    ) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .database(&settings.database)
            .username(&settings.user)
            .password(&settings.password)
            .ssl_mode(MySqlSslMode::Disabled)
            .charset("utf8mb4")
            .statement_cache_capacity(STATEMENT_CACHE_CAPACITY);

        // Checked-out connections are pinged first so sockets dropped by the
        // server are replaced instead of handed to a caller.
        let pool = MySqlPoolOptions::new()
            .max_connections(limits.max_connections)
            .min_connections(limits.min_connections)
            .acquire_timeout(acquire_timeout)
            .test_before_acquire(true)
            .connect_lazy_with(options);

        let target = settings.target();
        tracing::info!(
            server = %target,
            max_connections = limits.max_connections,
            min_connections = limits.min_connections,
            "Configured MySQL pool"
        );

        Self {
            pool,
            target,
            acquire_timeout,
            retry,
        }
    }

    /// Check out a connection, retrying transient failures per the policy.
    ///
    /// Retries share one `acquire_timeout` budget; a caller never waits longer.
    pub async fn acquire(&self) -> Result<PoolConnection<MySql>, DatabaseError> {
        let attempts = async {
            self.retry
                .run(
                    "acquire MySQL connection",
                    || self.pool.acquire(),
                    is_transient,
                )
                .await
                .map_err(|source| match source {
                    sqlx::Error::PoolClosed => DatabaseError::Closed,
                    source => DatabaseError::Connection {
                        target: self.target.clone(),
                        source,
                    },
                })
        };

        with_timeout("acquire MySQL connection", self.acquire_timeout, attempts).await
    }

    /// Stop handing out connections and wait for checked-out ones to come back.
    pub async fn close(&self) {
        if self.pool.is_closed() {
            return;
        }
        tracing::info!(
            server = %self.target,
            open_connections = self.pool.size(),
            "Closing MySQL pool"
        );
        self.pool.close().await;
    }
}

/// Failures worth another attempt: dropped sockets and crashed workers.
///
/// `PoolTimedOut` is final. The pool already retried connects until its own
/// deadline, which is the whole budget.
fn is_transient(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Io(_) | sqlx::Error::WorkerCrashed)
}
