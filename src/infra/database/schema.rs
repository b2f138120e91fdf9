// Schema initializer for the crown_players table.

use super::resilience::with_timeout;
use super::{ConnectionProvider, DbConnection, DatabaseError};
use std::time::Duration;

/// Same DDL for both dialects; `IF NOT EXISTS` keeps it safe on every start.
pub const CREATE_PLAYERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS crown_players (
        id CHAR(36) PRIMARY KEY,
        name VARCHAR(16) NOT NULL,
        coins INTEGER NOT NULL DEFAULT 0,
        gems INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// Create the player table if it does not exist yet.
pub async fn ensure_schema(conn: &mut DbConnection<'_>) -> Result<(), DatabaseError> {
    let result = match conn {
        DbConnection::Remote(c) => sqlx::query(CREATE_PLAYERS_TABLE)
            .execute(&mut **c)
            .await
            .map(|_| ()),
        DbConnection::Embedded(c) => sqlx::query(CREATE_PLAYERS_TABLE)
            .execute(&mut **c)
            .await
            .map(|_| ()),
    };
    result.map_err(DatabaseError::Schema)
}

/// Run the schema step once at startup, before any store is built.
///
/// If no connection can be acquired the DDL is never sent.
pub async fn initialize(
    provider: &ConnectionProvider,
    statement_timeout: Duration,
) -> Result<(), DatabaseError> {
    let mut conn = provider.acquire().await?;
    with_timeout(
        "create crown_players table",
        statement_timeout,
        ensure_schema(&mut conn),
    )
    .await?;

    tracing::info!(backend = %provider.backend(), "Player schema ready");
    Ok(())
}
