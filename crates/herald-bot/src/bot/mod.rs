//! Conversation handler
//!
//! [`HeroBot`] glues the pieces together for one inbound event:
//!
//! - private chats: slash commands first, then the menu dispatcher, then an
//!   optional completion call for assistant questions;
//! - group chats: the keyword responder only.
//!
//! Handling never fails. The session is stored before anything is sent, and
//! send failures are logged and dropped.

pub mod commands;
pub mod keywords;

use crate::dialog::content::{HELP_TEXT, WELCOME_TEXT};
use crate::dialog::{Dispatcher, MenuState};
use crate::error::Result;
use crate::interface::formatter;
use crate::interface::{ChatId, ChatKind, InboundEvent, MessageSender, OutgoingMessage, deliver};
use crate::session::{DialogSession, SessionManager};
use herald_llm::FallbackCompleter;
use herald_prompt::PromptCatalog;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub use commands::Command;
pub use keywords::{KeywordResponder, KeywordRule};

/// Template used to wrap assistant questions, when registered
pub const ASSISTANT_TEMPLATE: &str = "assistant_question";

const RESET_NOTICE: &str = "Something went wrong with this conversation, starting over.";

pub struct HeroBot {
    sender: Arc<dyn MessageSender>,
    dispatcher: Dispatcher,
    completer: FallbackCompleter,
    sessions: SessionManager,
    prompts: Arc<PromptCatalog>,
    keywords: KeywordResponder,
}

impl HeroBot {
    pub fn new(
        sender: Arc<dyn MessageSender>,
        dispatcher: Dispatcher,
        completer: FallbackCompleter,
    ) -> Self {
        Self {
            sender,
            dispatcher,
            completer,
            sessions: SessionManager::new(),
            prompts: Arc::new(PromptCatalog::default()),
            keywords: KeywordResponder::default(),
        }
    }

    pub fn with_sessions(mut self, sessions: SessionManager) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn with_prompts(mut self, prompts: Arc<PromptCatalog>) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordResponder) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Handle one inbound event end to end
    pub async fn handle(&self, event: &InboundEvent) {
        match event.kind {
            ChatKind::Private => self.handle_private(event).await,
            ChatKind::Group => self.handle_group(event).await,
        }
    }

    async fn handle_private(&self, event: &InboundEvent) {
        let (replies, completion) = match self.step(event.chat_id, &event.text) {
            Ok(step) => step,
            Err(e) => {
                error!(chat_id = %event.chat_id, error = %e, "Failed to handle message");
                return;
            }
        };

        for reply in &replies {
            deliver(self.sender.as_ref(), event.chat_id, reply).await;
        }

        if let Some(question) = completion {
            let answer = self.answer(&question).await;
            deliver(self.sender.as_ref(), event.chat_id, &OutgoingMessage::text(answer)).await;
        }
    }

    async fn handle_group(&self, event: &InboundEvent) {
        if let Some(reply) = self.keywords.respond(&event.text) {
            debug!(chat_id = %event.chat_id, "Keyword matched");
            deliver(self.sender.as_ref(), event.chat_id, &OutgoingMessage::text(reply)).await;
        }
    }

    /// Update the session for one input and store it
    fn step(&self, chat_id: ChatId, text: &str) -> Result<(Vec<OutgoingMessage>, Option<String>)> {
        let mut session = self.sessions.get_or_create(chat_id)?;

        let step = if let Some(command) = Command::parse(text) {
            info!(%chat_id, command = command.as_str(), "Command received");
            (self.run_command(command, &mut session)?, None)
        } else {
            match self.dispatcher.dispatch(&mut session, text) {
                Ok(outcome) => (outcome.replies, outcome.completion),
                Err(e) => {
                    warn!(%chat_id, error = %e, "Resetting conversation");
                    session.reset();
                    let mut replies = vec![OutgoingMessage::text(RESET_NOTICE)];
                    replies.extend(self.dispatcher.enter(MenuState::MainMenu, &session)?);
                    (replies, None)
                }
            }
        };

        self.sessions.update(session)?;
        Ok(step)
    }

    fn run_command(
        &self,
        command: Command,
        session: &mut DialogSession,
    ) -> Result<Vec<OutgoingMessage>> {
        let replies = match command {
            Command::Start => {
                session.reset();
                let mut replies = vec![OutgoingMessage::html(WELCOME_TEXT)];
                replies.extend(self.dispatcher.enter(MenuState::MainMenu, session)?);
                replies
            }
            Command::Help => vec![OutgoingMessage::html(HELP_TEXT)],
            Command::Search => {
                session.state = MenuState::SearchPerforming;
                self.dispatcher.enter(MenuState::SearchPerforming, session)?
            }
            Command::History => {
                vec![OutgoingMessage::html(formatter::search_history(&session.history))]
            }
        };
        Ok(replies)
    }

    async fn answer(&self, question: &str) -> String {
        let prompt = if self.prompts.get(ASSISTANT_TEMPLATE).is_some() {
            self.prompts
                .render(ASSISTANT_TEMPLATE, &json!({ "question": question }))
                .unwrap_or_else(|e| {
                    warn!(
                        error = %e,
                        "Failed to render assistant prompt, sending the raw question"
                    );
                    question.to_string()
                })
        } else {
            question.to_string()
        };
        self.completer.complete_text(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::content::{NO_RESULTS_TEXT, THINKING_TEXT, UNRECOGNIZED_TEXT};
    use crate::dialog::{InputKind, Menu, MenuTable, default_menu_table};
    use crate::heroes::sample_catalog;
    use crate::testing::{CannedProvider, RecordingSender};
    use herald_llm::FallbackSettings;
    use herald_prompt::PromptTemplate;

    fn bot_with(sender: Arc<RecordingSender>, provider: Arc<CannedProvider>) -> HeroBot {
        let dispatcher = Dispatcher::new(
            Arc::new(default_menu_table().unwrap()),
            Arc::new(sample_catalog()),
        );
        let completer = FallbackCompleter::new(provider, FallbackSettings::default());
        HeroBot::new(sender, dispatcher, completer)
            .with_keywords(KeywordResponder::with_defaults().unwrap())
    }

    fn bot(sender: Arc<RecordingSender>) -> HeroBot {
        bot_with(sender, Arc::new(CannedProvider::new(Some("42"))))
    }

    fn state_of(bot: &HeroBot, chat: i64) -> MenuState {
        bot.sessions().get(ChatId(chat)).unwrap().state
    }

    #[tokio::test]
    async fn test_start_sends_welcome_and_main_menu() {
        let sender = Arc::new(RecordingSender::default());
        let bot = bot(sender.clone());

        bot.handle(&InboundEvent::private(1, "/start")).await;

        let sent = sender.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1.text, WELCOME_TEXT);
        let keyboard = sent[1].1.keyboard.clone().unwrap();
        assert_eq!(
            keyboard.labels(),
            vec!["characters", "guides", "faq", "search", "history", "ask"]
        );
        assert_eq!(state_of(&bot, 1), MenuState::MainMenu);
    }

    #[tokio::test]
    async fn test_search_flow_end_to_end() {
        let sender = Arc::new(RecordingSender::default());
        let bot = bot(sender.clone());

        bot.handle(&InboundEvent::private(1, "search")).await;
        assert_eq!(state_of(&bot, 1), MenuState::SearchPerforming);

        bot.handle(&InboundEvent::private(1, "Dragon")).await;
        assert_eq!(state_of(&bot, 1), MenuState::SearchHeroResults);

        bot.handle(&InboundEvent::private(1, "Dragon Knight")).await;
        assert_eq!(state_of(&bot, 1), MenuState::SearchPerforming);

        bot.handle(&InboundEvent::private(1, "unicorn")).await;
        assert_eq!(state_of(&bot, 1), MenuState::MainMenu);
        assert!(sender.texts_for(1).iter().any(|t| t == NO_RESULTS_TEXT));

        sender.clear();
        bot.handle(&InboundEvent::private(1, "/history")).await;
        let texts = sender.texts_for(1);
        assert!(texts[0].contains("1. Dragon"));
        assert!(texts[0].contains("2. unicorn"));
    }

    #[tokio::test]
    async fn test_commands_work_inside_free_text_states() {
        let sender = Arc::new(RecordingSender::default());
        let bot = bot(sender.clone());

        bot.handle(&InboundEvent::private(1, "/search")).await;
        assert_eq!(state_of(&bot, 1), MenuState::SearchPerforming);

        bot.handle(&InboundEvent::private(1, "/help")).await;
        assert_eq!(state_of(&bot, 1), MenuState::SearchPerforming);
        assert_eq!(sender.texts_for(1).last().unwrap(), HELP_TEXT);

        bot.handle(&InboundEvent::private(1, "/start@HeraldBot")).await;
        assert_eq!(state_of(&bot, 1), MenuState::MainMenu);
    }

    #[tokio::test]
    async fn test_unknown_slash_command_is_unrecognized() {
        let sender = Arc::new(RecordingSender::default());
        let bot = bot(sender.clone());

        bot.handle(&InboundEvent::private(1, "/dance")).await;
        assert_eq!(sender.texts_for(1), vec![UNRECOGNIZED_TEXT.to_string()]);
    }

    #[tokio::test]
    async fn test_assistant_question_uses_template() {
        let sender = Arc::new(RecordingSender::default());
        let provider = Arc::new(CannedProvider::new(Some("Grind the daily dungeons.")));
        let prompts = PromptCatalog::from_templates(vec![PromptTemplate::new(
            ASSISTANT_TEMPLATE,
            "Answer briefly: {{ question }}",
        )]);
        let bot = bot_with(sender.clone(), provider.clone()).with_prompts(Arc::new(prompts));

        bot.handle(&InboundEvent::private(1, "ask")).await;
        sender.clear();
        bot.handle(&InboundEvent::private(1, "How to level fast?")).await;

        assert_eq!(
            sender.texts_for(1),
            vec![THINKING_TEXT.to_string(), "Grind the daily dungeons.".to_string()]
        );
        assert_eq!(
            provider.prompts(),
            vec!["Answer briefly: How to level fast?".to_string()]
        );
        assert_eq!(state_of(&bot, 1), MenuState::AskAssistant);
    }

    #[tokio::test]
    async fn test_assistant_failure_sends_fallback() {
        let sender = Arc::new(RecordingSender::default());
        let bot = bot_with(sender.clone(), Arc::new(CannedProvider::new(None)));

        bot.handle(&InboundEvent::private(1, "ask")).await;
        bot.handle(&InboundEvent::private(1, "anything")).await;

        assert_eq!(
            sender.texts_for(1).last().unwrap(),
            herald_llm::fallback::DEFAULT_FALLBACK_REPLY
        );
    }

    #[tokio::test]
    async fn test_send_failure_still_commits_state() {
        let sender = Arc::new(RecordingSender::failing_for([1]));
        let bot = bot(sender.clone());

        bot.handle(&InboundEvent::private(1, "faq")).await;
        assert_eq!(state_of(&bot, 1), MenuState::FaqMenu);
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_state_resets_to_main_menu() {
        let sender = Arc::new(RecordingSender::default());
        let table =
            MenuTable::new([Menu::new(MenuState::MainMenu, "Main", InputKind::Options)]).unwrap();
        let dispatcher = Dispatcher::new(Arc::new(table), Arc::new(sample_catalog()));
        let completer = FallbackCompleter::new(
            Arc::new(CannedProvider::new(None)),
            FallbackSettings::default(),
        );
        let bot = HeroBot::new(sender.clone(), dispatcher, completer);

        let mut session = bot.sessions().get_or_create(ChatId(3)).unwrap();
        session.state = MenuState::GuidesMenu;
        bot.sessions().update(session).unwrap();

        bot.handle(&InboundEvent::private(3, "beginner")).await;
        assert_eq!(state_of(&bot, 3), MenuState::MainMenu);
        assert_eq!(sender.texts_for(3), vec![RESET_NOTICE.to_string(), "Main".to_string()]);
    }

    #[tokio::test]
    async fn test_group_chat_uses_keywords_only() {
        let sender = Arc::new(RecordingSender::default());
        let bot = bot(sender.clone());

        bot.handle(&InboundEvent::group(-100, "Hello folks")).await;
        bot.handle(&InboundEvent::group(-100, "characters")).await;
        bot.handle(&InboundEvent::group(-100, "/start")).await;

        assert_eq!(sender.texts_for(-100).len(), 1);
        assert!(bot.sessions().get(ChatId(-100)).is_none());
    }

    #[tokio::test]
    async fn test_conversations_are_independent() {
        let sender = Arc::new(RecordingSender::default());
        let bot = bot(sender.clone());

        bot.handle(&InboundEvent::private(1, "guides")).await;
        bot.handle(&InboundEvent::private(2, "faq")).await;

        assert_eq!(state_of(&bot, 1), MenuState::GuidesMenu);
        assert_eq!(state_of(&bot, 2), MenuState::FaqMenu);
    }
}
