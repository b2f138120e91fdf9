// In-memory PlayerStore, used by service and command tests.
//
// DashMap's entry API locks the shard for the whole insert, which gives the
// same insert-if-absent guarantee as the SQL statements.

use crate::core::players::{PlayerAccount, PlayerError, PlayerId, PlayerStore};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

pub struct InMemoryPlayerStore {
    accounts: DashMap<PlayerId, PlayerAccount>,
}

impl InMemoryPlayerStore {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }
}

#[async_trait]
impl PlayerStore for InMemoryPlayerStore {
    async fn ensure_present(&self, id: &PlayerId, name: &str) -> Result<bool, PlayerError> {
        match self.accounts.entry(*id) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(PlayerAccount {
                    id: *id,
                    name: name.to_string(),
                    coins: 0,
                    gems: 0,
                    created_at: Utc::now(),
                });
                Ok(true)
            }
        }
    }

    async fn get_coins(&self, id: &PlayerId) -> Result<i64, PlayerError> {
        Ok(self.accounts.get(id).map(|a| a.coins).unwrap_or(0))
    }

    async fn get_account(&self, id: &PlayerId) -> Result<Option<PlayerAccount>, PlayerError> {
        Ok(self.accounts.get(id).map(|a| a.clone()))
    }

    async fn set_coins(&self, id: &PlayerId, coins: i64) -> Result<bool, PlayerError> {
        match self.accounts.get_mut(id) {
            Some(mut account) => {
                account.coins = coins;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
