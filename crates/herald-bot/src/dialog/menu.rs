//! Data-driven menu table
//!
//! Each [`Menu`] maps exact input labels to an [`Action`] and a [`Next`]
//! state. The whole table is checked once at construction so that dispatch
//! never meets a transition into an unregistered state.

use super::MenuState;
use crate::error::DialogError;
use std::collections::{HashMap, HashSet};

/// What kind of input a menu expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// One of the registered option labels
    Options,
    /// Any non-blank text, used as a hero search query
    HeroSearch,
    /// Any non-blank text, forwarded to the completion API
    AssistantQuery,
    /// A hero name from the latest search results, or an option label
    ResultPick,
}

impl InputKind {
    pub fn is_free_text(self) -> bool {
        matches!(self, InputKind::HeroSearch | InputKind::AssistantQuery)
    }

    /// States the dispatcher moves to on its own for this kind of input
    pub fn implicit_targets(self) -> &'static [MenuState] {
        match self {
            InputKind::HeroSearch => &[MenuState::SearchHeroResults, MenuState::MainMenu],
            InputKind::ResultPick => &[MenuState::SearchPerforming],
            InputKind::Options | InputKind::AssistantQuery => &[],
        }
    }
}

/// Side effect of picking an option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Transition only
    None,
    /// Send fixed HTML content
    Text(String),
    /// List the heroes whose role contains this class label
    ListClass(String),
    /// Show the conversation's search history
    ShowHistory,
}

/// Where the conversation goes after an option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    Stay,
    Go(MenuState),
}

impl Next {
    pub fn resolve(self, current: MenuState) -> MenuState {
        match self {
            Next::Stay => current,
            Next::Go(state) => state,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    pub action: Action,
    pub next: Next,
}

impl MenuOption {
    pub fn new(label: impl Into<String>, action: Action, next: Next) -> Self {
        Self {
            label: label.into(),
            action,
            next,
        }
    }

    /// Option that only moves to another menu
    pub fn go(label: impl Into<String>, target: MenuState) -> Self {
        Self::new(label, Action::None, Next::Go(target))
    }

    /// Option that sends content and stays
    pub fn show(label: impl Into<String>, action: Action) -> Self {
        Self::new(label, action, Next::Stay)
    }
}

/// One dialog state's prompt, input kind and options
#[derive(Debug, Clone)]
pub struct Menu {
    pub state: MenuState,
    /// HTML text sent whenever the conversation enters this menu
    pub prompt: String,
    pub input: InputKind,
    pub options: Vec<MenuOption>,
    /// Reply keyboard buttons per row
    pub per_row: usize,
}

impl Menu {
    pub fn new(state: MenuState, prompt: impl Into<String>, input: InputKind) -> Self {
        Self {
            state,
            prompt: prompt.into(),
            input,
            options: Vec::new(),
            per_row: 2,
        }
    }

    pub fn option(mut self, option: MenuOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn per_row(mut self, per_row: usize) -> Self {
        self.per_row = per_row;
        self
    }

    /// Exact, case-sensitive label lookup
    pub fn find(&self, label: &str) -> Option<&MenuOption> {
        self.options.iter().find(|option| option.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(|option| option.label.as_str())
    }
}

/// Complete, validated set of menus
#[derive(Debug, Clone)]
pub struct MenuTable {
    menus: HashMap<MenuState, Menu>,
}

impl MenuTable {
    /// Build and validate a table
    pub fn new(menus: impl IntoIterator<Item = Menu>) -> Result<Self, DialogError> {
        let table = Self {
            menus: menus.into_iter().map(|menu| (menu.state, menu)).collect(),
        };
        table.validate()?;
        Ok(table)
    }

    /// Check that the entry menu exists, labels are unique and every
    /// transition, explicit or implied by the input kind, lands on a
    /// registered menu
    pub fn validate(&self) -> Result<(), DialogError> {
        if !self.menus.contains_key(&MenuState::MainMenu) {
            return Err(DialogError::InvalidState(MenuState::MainMenu.to_string()));
        }

        for menu in self.menus.values() {
            if let Some(target) = menu
                .input
                .implicit_targets()
                .iter()
                .find(|target| !self.menus.contains_key(*target))
            {
                return Err(DialogError::DanglingTransition {
                    from: menu.state.to_string(),
                    to: target.to_string(),
                });
            }

            let mut seen = HashSet::new();
            for option in &menu.options {
                if !seen.insert(option.label.as_str()) {
                    return Err(DialogError::DuplicateLabel {
                        menu: menu.state.to_string(),
                        label: option.label.clone(),
                    });
                }
                match option.next {
                    Next::Go(target) if !self.menus.contains_key(&target) => {
                        return Err(DialogError::DanglingTransition {
                            from: menu.state.to_string(),
                            to: target.to_string(),
                        });
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Table that skips validation, for exercising dispatch against broken layouts
    #[cfg(test)]
    pub(crate) fn unchecked(menus: impl IntoIterator<Item = Menu>) -> Self {
        Self {
            menus: menus.into_iter().map(|menu| (menu.state, menu)).collect(),
        }
    }

    /// Menu registered for `state`
    pub fn menu(&self, state: MenuState) -> Result<&Menu, DialogError> {
        self.menus
            .get(&state)
            .ok_or_else(|| DialogError::InvalidState(state.to_string()))
    }

    pub fn states(&self) -> impl Iterator<Item = MenuState> + '_ {
        self.menus.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }
}
