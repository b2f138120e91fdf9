// The infra module contains implementations of core traits.
// Each feature implementation goes in its own submodule.

#[path = "database/mod.rs"]
pub mod database;

#[path = "players/mod.rs"]
pub mod players;
