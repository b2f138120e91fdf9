// SQL implementation of the PlayerStore trait (MySQL and SQLite)

use crate::core::players::{PlayerAccount, PlayerError, PlayerId, PlayerStore};
use crate::infra::database::resilience::with_timeout;
use crate::infra::database::{ConnectionProvider, DatabaseError, DbConnection};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

// Insert-if-absent differs per dialect; the remaining statements are shared.
const MYSQL_INSERT_IF_ABSENT: &str = "INSERT IGNORE INTO crown_players (id, name) VALUES (?, ?)";
const SQLITE_INSERT_IF_ABSENT: &str =
    "INSERT OR IGNORE INTO crown_players (id, name) VALUES (?, ?)";
const SELECT_COINS: &str = "SELECT coins FROM crown_players WHERE id = ?";
const SELECT_ACCOUNT: &str =
    "SELECT id, name, coins, gems, created_at FROM crown_players WHERE id = ?";
const UPDATE_COINS: &str = "UPDATE crown_players SET coins = ? WHERE id = ?";

/// Raw `crown_players` row, decoded the same way on both backends.
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: String,
    name: String,
    coins: i32,
    gems: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for PlayerAccount {
    type Error = PlayerError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let id = PlayerId::parse(&row.id)
            .map_err(|_| PlayerError::StoreError(format!("stored id {:?} is not a UUID", row.id)))?;
        Ok(PlayerAccount {
            id,
            name: row.name,
            coins: i64::from(row.coins),
            gems: i64::from(row.gems),
            created_at: row.created_at,
        })
    }
}

impl From<DatabaseError> for PlayerError {
    fn from(err: DatabaseError) -> Self {
        if err.is_unavailable() {
            PlayerError::Unavailable(err.to_string())
        } else {
            PlayerError::StoreError(err.to_string())
        }
    }
}

/// Player store over whichever backend the provider was opened with.
///
/// Each call checks out its own connection and drops it before returning, so
/// SQLite callers hold the shared lock for one statement only.
pub struct SqlPlayerStore {
    provider: Arc<ConnectionProvider>,
    statement_timeout: Duration,
}

impl SqlPlayerStore {
    pub fn new(provider: Arc<ConnectionProvider>, statement_timeout: Duration) -> Self {
        Self {
            provider,
            statement_timeout,
        }
    }
}

#[async_trait]
impl PlayerStore for SqlPlayerStore {
    async fn ensure_present(&self, id: &PlayerId, name: &str) -> Result<bool, PlayerError> {
        let key = id.as_key();
        let mut conn = self.provider.acquire().await?;

        let rows = with_timeout("insert player", self.statement_timeout, async {
            let result = match &mut conn {
                DbConnection::Remote(c) => sqlx::query(MYSQL_INSERT_IF_ABSENT)
                    .bind(&key)
                    .bind(name)
                    .execute(&mut **c)
                    .await
                    .map(|r| r.rows_affected()),
                DbConnection::Embedded(c) => sqlx::query(SQLITE_INSERT_IF_ABSENT)
                    .bind(&key)
                    .bind(name)
                    .execute(&mut **c)
                    .await
                    .map(|r| r.rows_affected()),
            };
            result.map_err(DatabaseError::Query)
        })
        .await?;

        Ok(rows > 0)
    }

    async fn get_coins(&self, id: &PlayerId) -> Result<i64, PlayerError> {
        let key = id.as_key();
        let mut conn = self.provider.acquire().await?;

        let coins = with_timeout("read coins", self.statement_timeout, async {
            let result = match &mut conn {
                DbConnection::Remote(c) => {
                    sqlx::query_scalar::<_, i32>(SELECT_COINS)
                        .bind(&key)
                        .fetch_optional(&mut **c)
                        .await
                }
                DbConnection::Embedded(c) => {
                    sqlx::query_scalar::<_, i32>(SELECT_COINS)
                        .bind(&key)
                        .fetch_optional(&mut **c)
                        .await
                }
            };
            result.map_err(DatabaseError::Query)
        })
        .await?;

        Ok(coins.map(i64::from).unwrap_or(0))
    }

    async fn get_account(&self, id: &PlayerId) -> Result<Option<PlayerAccount>, PlayerError> {
        let key = id.as_key();
        let mut conn = self.provider.acquire().await?;

        let row = with_timeout("read player", self.statement_timeout, async {
            let result = match &mut conn {
                DbConnection::Remote(c) => {
                    sqlx::query_as::<_, AccountRow>(SELECT_ACCOUNT)
                        .bind(&key)
                        .fetch_optional(&mut **c)
                        .await
                }
                DbConnection::Embedded(c) => {
                    sqlx::query_as::<_, AccountRow>(SELECT_ACCOUNT)
                        .bind(&key)
                        .fetch_optional(&mut **c)
                        .await
                }
            };
            result.map_err(DatabaseError::Query)
        })
        .await?;

        row.map(PlayerAccount::try_from).transpose()
    }

    async fn set_coins(&self, id: &PlayerId, coins: i64) -> Result<bool, PlayerError> {
        // The column is a 32-bit INTEGER on MySQL.
        let coins = i32::try_from(coins)
            .map_err(|_| PlayerError::StoreError(format!("balance {} is out of range", coins)))?;
        let key = id.as_key();
        let mut conn = self.provider.acquire().await?;

        let rows = with_timeout("update coins", self.statement_timeout, async {
            let result = match &mut conn {
                DbConnection::Remote(c) => sqlx::query(UPDATE_COINS)
                    .bind(coins)
                    .bind(&key)
                    .execute(&mut **c)
                    .await
                    .map(|r| r.rows_affected()),
                DbConnection::Embedded(c) => sqlx::query(UPDATE_COINS)
                    .bind(coins)
                    .bind(&key)
                    .execute(&mut **c)
                    .await
                    .map(|r| r.rows_affected()),
            };
            result.map_err(DatabaseError::Query)
        })
        .await?;

        Ok(rows > 0)
    }
}
