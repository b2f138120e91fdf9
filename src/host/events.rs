// Host events - what the game server tells us, and the line format it uses.
//
// One event per line:
//
//   arrive  <id> <name>
//   command <id> <name> <command> [args...]
//   console <command> [args...]
//
// Blank lines and lines starting with `#` carry no event.

use thiserror::Error;

/// Who invoked a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandSender {
    Player { id: String, name: String },
    Console,
}

impl CommandSender {
    /// Where the reply goes.
    pub fn recipient(&self) -> &str {
        match self {
            CommandSender::Player { name, .. } => name,
            CommandSender::Console => "console",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    PlayerArrived {
        id: String,
        name: String,
    },
    CommandInvoked {
        sender: CommandSender,
        command: String,
        args: Vec<String>,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventParseError {
    #[error("unknown event kind {0:?}")]
    UnknownKind(String),

    #[error("{kind} event is missing its {field}")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("arrive event has unexpected trailing input {0:?}")]
    TrailingInput(String),
}

/// Parse one protocol line. `Ok(None)` means the line carries no event.
pub fn parse_line(line: &str) -> Result<Option<HostEvent>, EventParseError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let kind = words.next().unwrap_or_default();
    let mut next = |kind: &'static str, field: &'static str| {
        words
            .next()
            .map(str::to_string)
            .ok_or(EventParseError::MissingField { kind, field })
    };

    let event = match kind.to_ascii_lowercase().as_str() {
        "arrive" => {
            let id = next("arrive", "id")?;
            let name = next("arrive", "name")?;
            if let Some(extra) = words.next() {
                return Err(EventParseError::TrailingInput(extra.to_string()));
            }
            HostEvent::PlayerArrived { id, name }
        }
        "command" => {
            let id = next("command", "id")?;
            let name = next("command", "name")?;
            let command = next("command", "command name")?;
            HostEvent::CommandInvoked {
                sender: CommandSender::Player { id, name },
                command,
                args: words.map(str::to_string).collect(),
            }
        }
        "console" => {
            let command = next("console", "command name")?;
            HostEvent::CommandInvoked {
                sender: CommandSender::Console,
                command,
                args: words.map(str::to_string).collect(),
            }
        }
        _ => return Err(EventParseError::UnknownKind(kind.to_string())),
    };

    Ok(Some(event))
}
