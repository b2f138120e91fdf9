// Player accounts core - business logic for player economy records
//
// Everything here is storage-agnostic: the service validates identities and
// balances, and the PlayerStore trait is the only way it reaches persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Longest display name the host allows (matches the VARCHAR(16) column).
pub const MAX_NAME_LEN: usize = 16;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// Stable player identity, always rendered as a 36-character hyphenated UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Parse any textual UUID form and normalize it.
    pub fn parse(raw: &str) -> Result<Self, PlayerError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| PlayerError::InvalidIdentity(raw.to_string()))
    }

    /// The key stored in the `id` column.
    pub fn as_key(&self) -> String {
        self.0.hyphenated().to_string()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// One row per distinct player.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerAccount {
    pub id: PlayerId,
    /// Name seen on first sighting. Later sightings never overwrite it.
    pub name: String,
    pub coins: i64,
    pub gems: i64,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Invalid player identity: {0:?}")]
    InvalidIdentity(String),

    #[error("Display name must be 1-16 characters, got {0:?}")]
    InvalidName(String),

    #[error("Balance cannot be negative: {0}")]
    NegativeBalance(i64),

    /// The backend could not be reached, timed out, or is shut down.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store error: {0}")]
    StoreError(String),
}

// ============================================================================
// STORAGE TRAIT
// ============================================================================

/// Trait for persisting player accounts.
///
/// Implementations must release whatever connection they acquire on every
/// exit path, including errors.
#[async_trait]
pub trait PlayerStore: Send + Sync {
    /// Insert a fresh account with zeroed balances unless one already exists.
    ///
    /// Has to be a single atomic insert-if-absent, so concurrent first
    /// sightings of the same player never race. Returns `true` when a row was
    /// created by this call.
    async fn ensure_present(&self, id: &PlayerId, name: &str) -> Result<bool, PlayerError>;

    /// Stored coin balance, or 0 when the player has no row. Never creates one.
    async fn get_coins(&self, id: &PlayerId) -> Result<i64, PlayerError>;

    /// Full account row, if present.
    async fn get_account(&self, id: &PlayerId) -> Result<Option<PlayerAccount>, PlayerError>;

    /// Overwrite the coin balance. Returns `false` when the player has no row.
    async fn set_coins(&self, id: &PlayerId, coins: i64) -> Result<bool, PlayerError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Entry point for player operations.
///
/// Generic over S: PlayerStore so the SQL backends and the in-memory store
/// are interchangeable.
pub struct PlayerService<S: PlayerStore> {
    store: S,
}

impl<S: PlayerStore> PlayerService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Record a sighting of a player, creating the account on first sight.
    pub async fn ensure_present(&self, raw_id: &str, name: &str) -> Result<bool, PlayerError> {
        let id = PlayerId::parse(raw_id)?;
        let name = validate_name(name)?;

        let created = self.store.ensure_present(&id, name).await?;
        if created {
            tracing::info!(player_id = %id, name, "Created player account");
        } else {
            tracing::debug!(player_id = %id, "Player account already present");
        }
        Ok(created)
    }

    /// Current coin balance; unknown players read as 0.
    pub async fn get_coins(&self, raw_id: &str) -> Result<i64, PlayerError> {
        let id = PlayerId::parse(raw_id)?;
        self.store.get_coins(&id).await
    }

    #[allow(dead_code)]
    pub async fn get_account(&self, raw_id: &str) -> Result<Option<PlayerAccount>, PlayerError> {
        let id = PlayerId::parse(raw_id)?;
        self.store.get_account(&id).await
    }

    /// Set a player's coin balance directly.
    ///
    /// Returns `false` if the player has never been seen.
    #[allow(dead_code)]
    pub async fn set_coins(&self, raw_id: &str, coins: i64) -> Result<bool, PlayerError> {
        let id = PlayerId::parse(raw_id)?;
        if coins < 0 {
            return Err(PlayerError::NegativeBalance(coins));
        }
        self.store.set_coins(&id, coins).await
    }
}

fn validate_name(name: &str) -> Result<&str, PlayerError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(PlayerError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::players::InMemoryPlayerStore;

    const ALICE: &str = "11111111-2222-3333-4444-555555555555";

    // Fails every call so tests can prove validation happens before storage.
    struct UnreachableStore;

    #[async_trait]
    impl PlayerStore for UnreachableStore {
        async fn ensure_present(&self, _: &PlayerId, _: &str) -> Result<bool, PlayerError> {
            Err(PlayerError::StoreError("store should not be used".to_string()))
        }

        async fn get_coins(&self, _: &PlayerId) -> Result<i64, PlayerError> {
            Err(PlayerError::StoreError("store should not be used".to_string()))
        }

        async fn get_account(&self, _: &PlayerId) -> Result<Option<PlayerAccount>, PlayerError> {
            Err(PlayerError::StoreError("store should not be used".to_string()))
        }

        async fn set_coins(&self, _: &PlayerId, _: i64) -> Result<bool, PlayerError> {
            Err(PlayerError::StoreError("store should not be used".to_string()))
        }
    }

    #[test]
    fn test_player_id_normalizes_uuid_forms() {
        let upper = PlayerId::parse("11111111-2222-3333-4444-55555555555A").unwrap();
        assert_eq!(upper.as_key(), "11111111-2222-3333-4444-55555555555a");
        assert_eq!(upper.as_key().len(), 36);

        let simple = PlayerId::parse("11111111222233334444555555555555").unwrap();
        assert_eq!(simple.as_key(), ALICE);
        assert_eq!(simple.to_string(), ALICE);
    }

    #[test]
    fn test_player_id_rejects_garbage() {
        assert!(matches!(
            PlayerId::parse("not-a-uuid"),
            Err(PlayerError::InvalidIdentity(_))
        ));
        assert!(matches!(
            PlayerId::parse(""),
            Err(PlayerError::InvalidIdentity(_))
        ));
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Alice ").unwrap(), "Alice");
        assert_eq!(validate_name("Sixteen_Chars_01").unwrap(), "Sixteen_Chars_01");
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("Seventeen_Chars_1").is_err());
    }

    #[tokio::test]
    async fn test_validation_runs_before_store() {
        let service = PlayerService::new(UnreachableStore);

        assert!(matches!(
            service.ensure_present("bogus", "Alice").await,
            Err(PlayerError::InvalidIdentity(_))
        ));
        assert!(matches!(
            service.ensure_present(ALICE, "").await,
            Err(PlayerError::InvalidName(_))
        ));
        assert!(matches!(
            service.set_coins(ALICE, -1).await,
            Err(PlayerError::NegativeBalance(-1))
        ));
        assert!(matches!(
            service.get_coins("bogus").await,
            Err(PlayerError::InvalidIdentity(_))
        ));
    }

    #[tokio::test]
    async fn test_first_sighting_then_noop() {
        let service = PlayerService::new(InMemoryPlayerStore::new());

        assert!(service.ensure_present(ALICE, "Alice").await.unwrap());
        assert!(!service.ensure_present(ALICE, "Alice").await.unwrap());
        assert_eq!(service.get_coins(ALICE).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rename_does_not_overwrite_balance_or_name() {
        let service = PlayerService::new(InMemoryPlayerStore::new());

        service.ensure_present(ALICE, "Alice").await.unwrap();
        assert!(service.set_coins(ALICE, 50).await.unwrap());
        assert_eq!(service.get_coins(ALICE).await.unwrap(), 50);

        service.ensure_present(ALICE, "Alicia").await.unwrap();
        let account = service.get_account(ALICE).await.unwrap().unwrap();
        assert_eq!(account.coins, 50);
        assert_eq!(account.name, "Alice");
    }

    #[tokio::test]
    async fn test_absent_player_reads_zero_without_creating() {
        let service = PlayerService::new(InMemoryPlayerStore::new());

        assert_eq!(service.get_coins(ALICE).await.unwrap(), 0);
        assert!(service.get_account(ALICE).await.unwrap().is_none());
        assert!(!service.set_coins(ALICE, 10).await.unwrap());
    }
}
