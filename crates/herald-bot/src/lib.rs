//! Herald: a Telegram hero FAQ bot
//!
//! This crate provides:
//!
//! - A data-driven menu dialog (characters, classes, guides, FAQ, hero search
//!   and an assistant backed by a chat-completion API)
//! - Slash commands and keyword replies for group chats
//! - Timed broadcasts, including a generated fact of the day
//! - A Telegram Bot API transport with long polling
//!
//! # Architecture
//!
//! Each inbound message flows through [`bot::HeroBot`]: commands are checked
//! first, then the [`dialog::Dispatcher`] applies the message to the
//! conversation's [`session::DialogSession`] using the [`dialog::MenuTable`].
//! Replies go out through the [`interface::MessageSender`] seam, which
//! [`platforms::telegram::TelegramClient`] implements.
//!
//! # Example
//!
//! ```rust,ignore
//! use herald_bot::dialog::{Dispatcher, default_menu_table};
//! use herald_bot::heroes::HeroCatalog;
//! use std::sync::Arc;
//!
//! let dispatcher = Dispatcher::new(
//!     Arc::new(default_menu_table()?),
//!     Arc::new(HeroCatalog::load_or_empty("data/heroes.json")),
//! );
//! ```

pub mod bot;
pub mod broadcast;
pub mod config;
pub mod dialog;
pub mod error;
pub mod heroes;
pub mod interface;
pub mod platforms;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

// Re-export main types for convenience
pub use bot::HeroBot;
pub use broadcast::{Broadcaster, CycleReport, Destination, FactOfTheDay, Schedule, StaticMessage};
pub use config::HeraldConfig;
pub use dialog::{Dispatcher, MenuState, MenuTable};
pub use error::{BotError, DialogError, Result};
pub use heroes::{Hero, HeroCatalog};
pub use session::SessionManager;
