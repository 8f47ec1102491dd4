//! Outbound delivery seam

use crate::error::Result;
use crate::interface::{ChatId, OutgoingMessage};
use async_trait::async_trait;
use tracing::{debug, error};

/// Something that can deliver a message to a conversation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<()>;
}

/// Send and swallow the failure
///
/// Returns whether the message was delivered. Failures are logged here and
/// never propagated: conversation state has already moved on by the time a
/// message is delivered.
pub async fn deliver(
    sender: &dyn MessageSender,
    chat_id: ChatId,
    message: &OutgoingMessage,
) -> bool {
    match sender.send(chat_id, message).await {
        Ok(()) => {
            debug!(%chat_id, chars = message.text.chars().count(), "Message sent");
            true
        }
        Err(e) => {
            error!(%chat_id, error = %e, "Failed to send message");
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::error::BotError;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records every send; chats in `failing` get an error instead
    #[derive(Default)]
    pub(crate) struct RecordingSender {
        sent: Mutex<Vec<(ChatId, OutgoingMessage)>>,
        failing: HashSet<ChatId>,
    }

    impl RecordingSender {
        pub(crate) fn failing_for(chats: impl IntoIterator<Item = i64>) -> Self {
            Self {
                sent: Mutex::default(),
                failing: chats.into_iter().map(ChatId).collect(),
            }
        }

        pub(crate) fn sent(&self) -> Vec<(ChatId, OutgoingMessage)> {
            self.sent.lock().unwrap().clone()
        }

        pub(crate) fn texts_for(&self, chat: i64) -> Vec<String> {
            self.sent()
                .into_iter()
                .filter(|(id, _)| *id == ChatId(chat))
                .map(|(_, msg)| msg.text)
                .collect()
        }

        pub(crate) fn clear(&self) {
            self.sent.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<()> {
            if self.failing.contains(&chat_id) {
                return Err(BotError::Telegram {
                    method: "sendMessage".to_string(),
                    description: "Forbidden: bot was blocked by the user".to_string(),
                });
            }
            self.sent.lock().unwrap().push((chat_id, message.clone()));
            Ok(())
        }
    }
}
