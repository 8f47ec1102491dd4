//! Dialog dispatcher
//!
//! Pure transition step: `(session, input) -> (replies, next state, optional
//! completion prompt)`. Nothing here talks to the network; the caller stores
//! the session and delivers the replies.

use super::content::{
    EMPTY_CLASS_TEXT, NO_RESULTS_TEXT, THINKING_TEXT, UNKNOWN_HERO_TEXT, UNRECOGNIZED_TEXT,
};
use super::menu::{Action, InputKind, Menu, MenuTable};
use super::MenuState;
use crate::error::DialogError;
use crate::heroes::HeroCatalog;
use crate::interface::formatter;
use crate::interface::{Keyboard, LinkButton, OutgoingMessage};
use crate::session::DialogSession;
use std::sync::Arc;
use tracing::debug;

/// Result of one dispatch step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Messages to send, in order
    pub replies: Vec<OutgoingMessage>,
    /// State the session was moved to
    pub next: MenuState,
    /// Question to forward to the completion API, if any
    pub completion: Option<String>,
}

impl Outcome {
    fn new(replies: Vec<OutgoingMessage>, next: MenuState) -> Self {
        Self {
            replies,
            next,
            completion: None,
        }
    }
}

pub struct Dispatcher {
    table: Arc<MenuTable>,
    heroes: Arc<HeroCatalog>,
}

impl Dispatcher {
    pub fn new(table: Arc<MenuTable>, heroes: Arc<HeroCatalog>) -> Self {
        Self { table, heroes }
    }

    pub fn table(&self) -> &MenuTable {
        &self.table
    }

    pub fn heroes(&self) -> &HeroCatalog {
        &self.heroes
    }

    /// Apply one input to the session
    ///
    /// On success `session.state` equals `outcome.next`. Fails only when the
    /// session sits in a state with no registered menu; the session is left
    /// untouched in that case.
    pub fn dispatch(
        &self,
        session: &mut DialogSession,
        input: &str,
    ) -> Result<Outcome, DialogError> {
        let menu = self.table.menu(session.state)?;
        debug!(chat_id = %session.chat_id, state = %session.state, "Dispatching input");

        let outcome = match menu.input {
            InputKind::Options => self.pick_option(menu, session, input)?,
            InputKind::HeroSearch => self.search(menu, session, input)?,
            InputKind::AssistantQuery => Self::ask(menu, input),
            InputKind::ResultPick => self.pick_result(menu, session, input)?,
        };

        session.state = outcome.next;
        Ok(outcome)
    }

    /// Messages announcing `state`: its prompt with a freshly built keyboard
    pub fn enter(
        &self,
        state: MenuState,
        session: &DialogSession,
    ) -> Result<Vec<OutgoingMessage>, DialogError> {
        let menu = self.table.menu(state)?;
        Ok(vec![
            OutgoingMessage::html(menu.prompt.clone()).with_keyboard(Self::keyboard(menu, session)),
        ])
    }

    fn keyboard(menu: &Menu, session: &DialogSession) -> Keyboard {
        match menu.input {
            InputKind::Options => Keyboard::from_labels(menu.labels(), menu.per_row),
            InputKind::ResultPick => Keyboard::from_labels(
                session
                    .last_results
                    .iter()
                    .map(String::as_str)
                    .chain(menu.labels()),
                menu.per_row,
            ),
            InputKind::HeroSearch | InputKind::AssistantQuery => Keyboard::Remove,
        }
    }

    fn unrecognized(menu: &Menu, session: &DialogSession) -> Outcome {
        Outcome::new(
            vec![
                OutgoingMessage::text(UNRECOGNIZED_TEXT)
                    .with_keyboard(Self::keyboard(menu, session)),
            ],
            menu.state,
        )
    }

    /// Move to `next`, announcing it when it differs from the current menu
    fn transition(
        &self,
        menu: &Menu,
        session: &DialogSession,
        mut replies: Vec<OutgoingMessage>,
        next: MenuState,
    ) -> Result<Outcome, DialogError> {
        if next == menu.state {
            if let Some(last) = replies.last_mut() {
                last.keyboard.get_or_insert_with(|| Self::keyboard(menu, session));
            }
        } else {
            replies.extend(self.enter(next, session)?);
        }
        Ok(Outcome::new(replies, next))
    }

    fn pick_option(
        &self,
        menu: &Menu,
        session: &DialogSession,
        input: &str,
    ) -> Result<Outcome, DialogError> {
        let Some(option) = menu.find(input) else {
            return Ok(Self::unrecognized(menu, session));
        };

        let replies = self.perform(&option.action, session);
        self.transition(menu, session, replies, option.next.resolve(menu.state))
    }

    fn perform(&self, action: &Action, session: &DialogSession) -> Vec<OutgoingMessage> {
        match action {
            Action::None => Vec::new(),
            Action::Text(content) => vec![OutgoingMessage::html(content.clone())],
            Action::ListClass(class) => {
                let heroes = self.heroes.by_class(class);
                if heroes.is_empty() {
                    vec![OutgoingMessage::text(EMPTY_CLASS_TEXT)]
                } else {
                    let heading = format!("{} heroes", capitalize(class));
                    vec![OutgoingMessage::html(formatter::hero_list(&heading, &heroes))]
                }
            }
            Action::ShowHistory => {
                vec![OutgoingMessage::html(formatter::search_history(&session.history))]
            }
        }
    }

    fn search(
        &self,
        menu: &Menu,
        session: &mut DialogSession,
        input: &str,
    ) -> Result<Outcome, DialogError> {
        let query = input.trim();
        if query.is_empty() {
            return Ok(Outcome::new(self.enter(menu.state, session)?, menu.state));
        }

        let results = self.heroes.search(query);
        debug!(query, matches = results.len(), "Hero search");

        let (replies, next) = if results.is_empty() {
            (vec![OutgoingMessage::text(NO_RESULTS_TEXT)], MenuState::MainMenu)
        } else {
            let listing = formatter::hero_list("Search results", &results);
            (vec![OutgoingMessage::html(listing)], MenuState::SearchHeroResults)
        };

        // The results keyboard is built from `last_results`, so set them
        // first and put the old ones back if the transition fails
        let names = results.iter().map(|hero| hero.name.clone()).collect();
        let previous = std::mem::replace(&mut session.last_results, names);
        match self.transition(menu, session, replies, next) {
            Ok(outcome) => {
                session.history.record(query);
                Ok(outcome)
            }
            Err(e) => {
                session.last_results = previous;
                Err(e)
            }
        }
    }

    fn ask(menu: &Menu, input: &str) -> Outcome {
        let question = input.trim();
        if question.is_empty() {
            return Outcome::new(
                vec![OutgoingMessage::html(menu.prompt.clone()).with_keyboard(Keyboard::Remove)],
                menu.state,
            );
        }

        Outcome {
            replies: vec![OutgoingMessage::text(THINKING_TEXT)],
            next: menu.state,
            completion: Some(question.to_string()),
        }
    }

    fn pick_result(
        &self,
        menu: &Menu,
        session: &DialogSession,
        input: &str,
    ) -> Result<Outcome, DialogError> {
        if session.last_results.iter().any(|name| name == input) {
            let reply = match self.heroes.by_name(input) {
                Some(hero) => OutgoingMessage::html(formatter::hero_detail(hero)).with_keyboard(
                    Keyboard::Links(vec![LinkButton {
                        label: "More details".to_string(),
                        url: hero.details_link.clone(),
                    }]),
                ),
                None => OutgoingMessage::text(UNKNOWN_HERO_TEXT),
            };
            return self.transition(menu, session, vec![reply], MenuState::SearchPerforming);
        }

        self.pick_option(menu, session, input)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}
