// Host layer - events from the game server, commands, and dispatch.

#[path = "commands/command_catalog.rs"]
pub mod commands;

pub mod dispatcher;

pub mod events;
