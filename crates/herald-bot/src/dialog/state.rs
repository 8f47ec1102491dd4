//! Dialog state enumeration

use crate::error::DialogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Menu a conversation is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MenuState {
    #[default]
    MainMenu,
    CharactersMenu,
    ClassesMenu,
    GuidesMenu,
    FaqMenu,
    /// Waiting for a free-text hero search query
    SearchPerforming,
    /// Search results are on screen, waiting for a pick
    SearchHeroResults,
    /// Waiting for a free-text question for the assistant
    AskAssistant,
}

impl MenuState {
    pub const ALL: [MenuState; 8] = [
        MenuState::MainMenu,
        MenuState::CharactersMenu,
        MenuState::ClassesMenu,
        MenuState::GuidesMenu,
        MenuState::FaqMenu,
        MenuState::SearchPerforming,
        MenuState::SearchHeroResults,
        MenuState::AskAssistant,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MenuState::MainMenu => "MainMenu",
            MenuState::CharactersMenu => "CharactersMenu",
            MenuState::ClassesMenu => "ClassesMenu",
            MenuState::GuidesMenu => "GuidesMenu",
            MenuState::FaqMenu => "FaqMenu",
            MenuState::SearchPerforming => "SearchPerforming",
            MenuState::SearchHeroResults => "SearchHeroResults",
            MenuState::AskAssistant => "AskAssistant",
        }
    }
}

impl fmt::Display for MenuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MenuState {
    type Err = DialogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MenuState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| DialogError::InvalidState(s.to_string()))
    }
}
