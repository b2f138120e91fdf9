// Players module - domain logic for player accounts and their balances

mod player_service;

pub use player_service::{PlayerAccount, PlayerError, PlayerId, PlayerService, PlayerStore};
