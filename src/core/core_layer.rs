// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "players/mod.rs"]
pub mod players;
