//! Messaging platform transports

pub mod telegram;

pub use telegram::{TelegramClient, TelegramConfig, TelegramPoller, Update, UpdateSource};
