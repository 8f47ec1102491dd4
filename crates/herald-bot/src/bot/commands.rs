//! Slash command parsing
//!
//! Commands are checked before menu dispatch. Anything that is not one of the
//! known commands, including unknown slash commands, is left to the menus.

/// Recognized bot command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reset to the main menu
    Start,
    /// Show help
    Help,
    /// Jump to hero search
    Search,
    /// Show search history
    History,
}

impl Command {
    /// Parse a command from user input
    ///
    /// Accepts an optional `@botname` suffix on the command word and ignores
    /// trailing arguments. Returns `None` for anything else.
    pub fn parse(input: &str) -> Option<Self> {
        let word = input.trim().split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split_once('@').map_or(name, |(name, _bot)| name);

        match name.to_lowercase().as_str() {
            "start" => Some(Command::Start),
            "help" => Some(Command::Help),
            "search" => Some(Command::Search),
            "history" => Some(Command::History),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Search => "search",
            Command::History => "history",
        }
    }
}
