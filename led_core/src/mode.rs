//! Session modes

/// State of the interactive command loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionMode {
    /// Awaiting a command token
    Command,
    /// Awaiting raw text lines for a pending command
    Text,
    /// Terminal state
    Exit,
}

impl SessionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Command => "COMMAND",
            SessionMode::Text => "TEXT",
            SessionMode::Exit => "EXIT",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionMode::Exit)
    }
}
