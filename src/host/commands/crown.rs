// The /crown ping command
//
// Same shape as every other command:
// 1. Check who is asking
// 2. Call the core service
// 3. Format the reply

use crate::core::players::{PlayerError, PlayerService, PlayerStore};
use crate::host::events::CommandSender;
use crate::infra::database::Backend;

pub const COMMAND_NAME: &str = "crown";

// Plain text only. Colours and styling are left to the host.
pub const PLAYERS_ONLY_REPLY: &str = "This command is reserved for players.";
pub const FAILURE_REPLY: &str = "[CrownPvP] Something went wrong, please try again later.";

/// Reply with the sender's coin balance and the active backend.
///
/// Store failures are logged and turned into a generic reply; they never
/// escape this function.
pub async fn crown<S: PlayerStore>(
    players: &PlayerService<S>,
    backend: Backend,
    sender: &CommandSender,
) -> String {
    let CommandSender::Player { id, name } = sender else {
        return PLAYERS_ONLY_REPLY.to_string();
    };

    match balance_for(players, id, name).await {
        Ok(coins) => format_ping(coins, backend),
        Err(e) => {
            tracing::error!(player_id = %id, player = %name, "crown command failed: {}", e);
            FAILURE_REPLY.to_string()
        }
    }
}

async fn balance_for<S: PlayerStore>(
    players: &PlayerService<S>,
    id: &str,
    name: &str,
) -> Result<i64, PlayerError> {
    players.ensure_present(id, name).await?;
    players.get_coins(id).await
}

fn format_ping(coins: i64, backend: Backend) -> String {
    format!(
        "[CrownPvP] Ping! Coins: {} (DB: {})",
        coins,
        backend.display_name()
    )
}
