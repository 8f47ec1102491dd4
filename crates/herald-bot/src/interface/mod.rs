//! Platform-agnostic message types and the outbound delivery seam

pub mod formatter;
pub mod message;
pub mod sender;

pub use message::{ChatId, ChatKind, InboundEvent, Keyboard, LinkButton, OutgoingMessage, ParseMode};
pub use sender::{MessageSender, deliver};

#[cfg(test)]
pub use sender::MockMessageSender;
