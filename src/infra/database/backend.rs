// Backend selection - decided once from `db.type` and fixed for the process

use std::fmt;

/// Which storage technology is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Pooled connections to a MySQL server.
    Remote,
    /// Single connection to a local SQLite file.
    Embedded,
}

impl Backend {
    /// `"mysql"` (any case) selects the remote backend; anything else, or no
    /// value at all, selects the embedded one.
    pub fn select(db_type: Option<&str>) -> Self {
        match db_type {
            Some(value) if value.trim().eq_ignore_ascii_case("mysql") => Backend::Remote,
            _ => Backend::Embedded,
        }
    }

    /// Name shown to players.
    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::Remote => "MySQL",
            Backend::Embedded => "SQLite",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
