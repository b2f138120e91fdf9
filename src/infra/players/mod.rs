// Player infrastructure - SQL storage for player accounts

mod sql_player_store;

#[cfg(test)]
mod in_memory;

pub use sql_player_store::SqlPlayerStore;

#[cfg(test)]
pub use in_memory::InMemoryPlayerStore;
