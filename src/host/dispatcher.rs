// Routes host events to the player service and commands.

use crate::core::players::{PlayerService, PlayerStore};
use crate::host::commands::crown;
use crate::host::events::HostEvent;
use crate::infra::database::Backend;
use std::sync::Arc;

/// A message to send back through the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub recipient: String,
    pub text: String,
}

pub struct EventDispatcher<S: PlayerStore> {
    players: Arc<PlayerService<S>>,
    backend: Backend,
}

impl<S: PlayerStore> EventDispatcher<S> {
    pub fn new(players: Arc<PlayerService<S>>, backend: Backend) -> Self {
        Self { players, backend }
    }

    /// Handle one event. Only commands we own produce a reply.
    ///
    /// Failures are logged here and never returned, so one bad event cannot
    /// take the host down.
    pub async fn dispatch(&self, event: HostEvent) -> Option<Reply> {
        match event {
            HostEvent::PlayerArrived { id, name } => {
                if let Err(e) = self.players.ensure_present(&id, &name).await {
                    tracing::error!(player_id = %id, player = %name, "Failed to record arrival: {}", e);
                }
                None
            }
            HostEvent::CommandInvoked {
                sender,
                command,
                args,
            } => {
                if !command.eq_ignore_ascii_case(crown::COMMAND_NAME) {
                    tracing::debug!(command = %command, ?args, "Ignoring command we do not own");
                    return None;
                }

                let text = crown::crown(&*self.players, self.backend, &sender).await;
                Some(Reply {
                    recipient: sender.recipient().to_string(),
                    text,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::events::{parse_line, CommandSender};
    use crate::infra::players::InMemoryPlayerStore;

    const ALICE: &str = "11111111-2222-3333-4444-555555555555";

    fn dispatcher() -> EventDispatcher<InMemoryPlayerStore> {
        let players = Arc::new(PlayerService::new(InMemoryPlayerStore::new()));
        EventDispatcher::new(players, Backend::Embedded)
    }

    fn event(line: &str) -> HostEvent {
        parse_line(line).unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_arrival_creates_account_without_reply() {
        let dispatcher = dispatcher();

        let reply = dispatcher
            .dispatch(event(&format!("arrive {} Alice", ALICE)))
            .await;

        assert_eq!(reply, None);
        let account = dispatcher.players.get_account(ALICE).await.unwrap().unwrap();
        assert_eq!(account.name, "Alice");
        assert_eq!(account.coins, 0);
    }

    #[tokio::test]
    async fn test_bad_arrival_is_swallowed() {
        let dispatcher = dispatcher();

        let reply = dispatcher.dispatch(event("arrive nope Alice")).await;

        assert_eq!(reply, None);
    }

    #[tokio::test]
    async fn test_crown_command_replies_to_sender() {
        let dispatcher = dispatcher();

        let reply = dispatcher
            .dispatch(event(&format!("command {} Alice CROWN", ALICE)))
            .await;

        assert_eq!(
            reply,
            Some(Reply {
                recipient: "Alice".to_string(),
                text: "[CrownPvP] Ping! Coins: 0 (DB: SQLite)".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_console_crown_gets_fixed_reply() {
        let dispatcher = dispatcher();

        let reply = dispatcher.dispatch(event("console crown")).await.unwrap();

        assert_eq!(reply.recipient, CommandSender::Console.recipient());
        assert_eq!(reply.text, crown::PLAYERS_ONLY_REPLY);
    }

    #[tokio::test]
    async fn test_other_commands_are_not_handled() {
        let dispatcher = dispatcher();

        let reply = dispatcher
            .dispatch(event(&format!("command {} Alice spawn", ALICE)))
            .await;

        assert_eq!(reply, None);
        assert!(dispatcher.players.get_account(ALICE).await.unwrap().is_none());
    }
}
