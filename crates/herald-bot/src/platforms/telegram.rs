//! Telegram Bot API transport
//!
//! A thin client over `reqwest` for the two methods the bot needs
//! (`getUpdates` and `sendMessage`) plus the long-poll loop that feeds
//! [`HeroBot`] through one worker task per conversation.
//!
//! See: https://core.telegram.org/bots/api

use crate::bot::HeroBot;
use crate::error::{BotError, Result};
use crate::interface::{
    ChatId, ChatKind, InboundEvent, Keyboard, MessageSender, OutgoingMessage, ParseMode,
};
use async_trait::async_trait;
use futures::future::join_all;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use herald_utils::{env_or, env_string_or, require_env};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MESSAGES_PER_SECOND: u32 = 30;
const INITIAL_BACKOFF_SECS: u64 = 2;
const MAX_BACKOFF_SECS: u64 = 60;

/// Telegram bot configuration
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token from BotFather
    pub token: String,

    /// Base URL of the Bot API (default: "https://api.telegram.org")
    pub api_base: String,

    /// Server-side long-poll timeout for `getUpdates`
    pub poll_timeout_secs: u64,

    /// Outbound message budget
    pub messages_per_second: u32,
}

impl TelegramConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
            messages_per_second: DEFAULT_MESSAGES_PER_SECOND,
        }
    }

    /// Read `TELEGRAM_BOT_TOKEN` (required) and `TELEGRAM_API_BASE`
    pub fn from_env() -> Result<Self> {
        let token = require_env("TELEGRAM_BOT_TOKEN")?;
        Ok(Self {
            api_base: env_string_or("TELEGRAM_API_BASE", DEFAULT_API_BASE),
            poll_timeout_secs: env_or("TELEGRAM_POLL_TIMEOUT_SECS", DEFAULT_POLL_TIMEOUT_SECS)?,
            ..Self::new(token)
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base.trim_end_matches('/'), self.token)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// One entry returned by `getUpdates`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub chat: TelegramChat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Update {
    /// Convert to a platform-neutral event; updates without a message are skipped
    pub fn into_event(self) -> Option<InboundEvent> {
        let message = self.message?;
        let kind = if message.chat.kind == "private" {
            ChatKind::Private
        } else {
            ChatKind::Group
        };
        Some(InboundEvent {
            chat_id: ChatId(message.chat.id),
            kind,
            text: message.text.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<Value>,
}

fn reply_markup(keyboard: &Keyboard) -> Value {
    match keyboard {
        Keyboard::Reply(rows) => json!({
            "keyboard": rows
                .iter()
                .map(|row| row.iter().map(|label| json!({ "text": label })).collect::<Vec<_>>())
                .collect::<Vec<_>>(),
            "resize_keyboard": true,
        }),
        Keyboard::Remove => json!({ "remove_keyboard": true }),
        Keyboard::Links(buttons) => json!({
            "inline_keyboard": buttons
                .iter()
                .map(|button| vec![json!({ "text": button.label, "url": button.url })])
                .collect::<Vec<_>>(),
        }),
    }
}

fn send_message_request(chat_id: ChatId, message: &OutgoingMessage) -> SendMessageRequest<'_> {
    SendMessageRequest {
        chat_id: chat_id.0,
        text: &message.text,
        parse_mode: message.parse_mode,
        reply_markup: message.keyboard.as_ref().map(reply_markup),
    }
}

/// Unwrap a Bot API envelope
///
/// Telegram reports errors as `{"ok": false, "description": ...}`, usually
/// with a non-2xx status; a body that is not an envelope at all falls back to
/// the HTTP status.
fn parse_response<T: DeserializeOwned>(method: &str, status: u16, body: &str) -> Result<T> {
    let envelope: ApiResponse<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(e) if (200..300).contains(&status) => return Err(e.into()),
        Err(_) => {
            return Err(BotError::Telegram {
                method: method.to_string(),
                description: format!("HTTP {status}"),
            });
        }
    };

    match envelope {
        ApiResponse {
            ok: true,
            result: Some(result),
            ..
        } => Ok(result),
        ApiResponse { description, .. } => Err(BotError::Telegram {
            method: method.to_string(),
            description: description.unwrap_or_else(|| format!("HTTP {status}")),
        }),
    }
}

// ============================================================================
// Client
// ============================================================================

/// Bot API client
pub struct TelegramClient {
    client: Client,
    config: TelegramConfig,
    rate_limiter: SharedRateLimiter,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self> {
        // Leave room for the long poll on top of the server-side timeout
        let client = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()?;

        let per_second = NonZeroU32::new(config.messages_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_second(per_second)));

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    async fn call<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T> {
        let response = self
            .client
            .post(self.config.method_url(method))
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;
        parse_response(method, status, &text)
    }

    /// Long-poll for new updates starting at `offset`
    #[instrument(skip(self))]
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: self.config.poll_timeout_secs,
            allowed_updates: ["message"],
        };
        self.call("getUpdates", &request).await
    }

    /// Send one message, waiting for the rate limiter first
    pub async fn send_message(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<()> {
        self.rate_limiter.until_ready().await;
        let _sent: Value = self
            .call("sendMessage", &send_message_request(chat_id, message))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl MessageSender for TelegramClient {
    async fn send(&self, chat_id: ChatId, message: &OutgoingMessage) -> Result<()> {
        self.send_message(chat_id, message).await
    }
}

/// Source of updates for the poll loop
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>>;
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        TelegramClient::get_updates(self, offset).await
    }
}

// ============================================================================
// Poll loop
// ============================================================================

/// How long a conversation worker waits for its next event before exiting
const WORKER_IDLE_SECS: u64 = 600;

/// One conversation's queue and the task draining it
struct ChatWorker {
    queue: mpsc::UnboundedSender<InboundEvent>,
    task: JoinHandle<()>,
}

/// Handle one conversation's events strictly in arrival order
async fn run_chat_worker(
    bot: Arc<HeroBot>,
    mut queue: mpsc::UnboundedReceiver<InboundEvent>,
    idle: Duration,
) {
    loop {
        match tokio::time::timeout(idle, queue.recv()).await {
            Ok(Some(event)) => bot.handle(&event).await,
            Ok(None) => return,
            Err(_) => {
                // Refuse new events, then finish the ones already queued
                queue.close();
                while let Some(event) = queue.recv().await {
                    bot.handle(&event).await;
                }
                return;
            }
        }
    }
}

/// Long-poll loop feeding the bot
///
/// Every conversation gets its own worker task, so a slow completion in one
/// chat never holds up polling or the other chats.
pub struct TelegramPoller {
    source: Arc<dyn UpdateSource>,
    bot: Arc<HeroBot>,
    offset: Option<i64>,
    workers: HashMap<ChatId, ChatWorker>,
}

impl TelegramPoller {
    pub fn new(source: Arc<dyn UpdateSource>, bot: Arc<HeroBot>) -> Self {
        Self {
            source,
            bot,
            offset: None,
            workers: HashMap::new(),
        }
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Conversations with a live worker
    pub fn active_conversations(&self) -> usize {
        self.workers
            .values()
            .filter(|worker| !worker.queue.is_closed())
            .count()
    }

    /// Fetch one batch and queue it; returns the number of events queued
    ///
    /// Returns as soon as the events are queued, without waiting for them
    /// to be handled.
    pub async fn poll_once(&mut self) -> Result<usize> {
        let updates = self.source.get_updates(self.offset).await?;
        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            self.offset = Some(last + 1);
        }

        self.workers.retain(|_, worker| !worker.queue.is_closed());

        let mut queued = 0;
        for event in updates.into_iter().filter_map(Update::into_event) {
            self.enqueue(event);
            queued += 1;
        }
        if queued > 0 {
            debug!(count = queued, workers = self.workers.len(), "Queued updates");
        }
        Ok(queued)
    }

    fn enqueue(&mut self, event: InboundEvent) {
        let chat_id = event.chat_id;
        let event = match self.workers.get(&chat_id) {
            Some(worker) => match worker.queue.send(event) {
                Ok(()) => return,
                // The worker went idle and closed its queue
                Err(mpsc::error::SendError(event)) => event,
            },
            None => event,
        };

        let (queue, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_chat_worker(
            Arc::clone(&self.bot),
            receiver,
            Duration::from_secs(WORKER_IDLE_SECS),
        ));
        if queue.send(event).is_err() {
            error!(%chat_id, "Conversation worker exited before its first event");
        }
        self.workers.insert(chat_id, ChatWorker { queue, task });
    }

    /// Stop taking events and wait until every queued one has been handled
    pub async fn shutdown(&mut self) {
        let tasks: Vec<_> = self
            .workers
            .drain()
            .map(|(_, ChatWorker { task, .. })| task)
            .collect();

        for result in join_all(tasks).await {
            if let Err(e) = result {
                error!(error = %e, "Conversation worker failed");
            }
        }
    }

    /// Poll forever, backing off on failures
    pub async fn run(mut self) {
        info!("Telegram polling started");
        let mut backoff = INITIAL_BACKOFF_SECS;

        loop {
            match self.poll_once().await {
                Ok(_) => backoff = INITIAL_BACKOFF_SECS,
                Err(e) => {
                    error!(error = %e, retry_in_secs = backoff, "Polling Telegram failed");
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    backoff = backoff.saturating_mul(2).min(MAX_BACKOFF_SECS);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialog::{Dispatcher, MenuState, default_menu_table};
    use crate::heroes::sample_catalog;
    use crate::interface::{LinkButton, deliver};
    use crate::testing::{CannedProvider, RecordingSender};
    use herald_llm::{
        CompletionRequest, CompletionResponse, FallbackCompleter, FallbackSettings, LLMProvider,
    };
    use httpmock::Method::POST;
    use httpmock::MockServer;

    fn update(id: i64, chat: i64, kind: &str, text: Option<&str>) -> Update {
        Update {
            update_id: id,
            message: Some(TelegramMessage {
                message_id: id,
                chat: TelegramChat {
                    id: chat,
                    kind: kind.to_string(),
                },
                text: text.map(str::to_string),
            }),
        }
    }

    #[test]
    fn test_config_urls() {
        let config = TelegramConfig::new("123:abc").with_api_base("http://localhost:8081/");
        assert_eq!(config.method_url("getUpdates"), "http://localhost:8081/bot123:abc/getUpdates");
        assert_eq!(TelegramConfig::new("t").api_base, "https://api.telegram.org");
    }

    #[test]
    fn test_parse_updates() {
        let body = r#"{"ok": true, "result": [
            {"update_id": 10, "message": {
                "message_id": 1, "chat": {"id": 5, "type": "private"}, "text": "/start"
            }},
            {"update_id": 11, "message": {
                "message_id": 2, "chat": {"id": -100, "type": "supergroup"}, "text": "hello"
            }},
            {"update_id": 12, "message": {"message_id": 3, "chat": {"id": 5, "type": "private"}}},
            {"update_id": 13, "edited_message": {}}
        ]}"#;

        let updates: Vec<Update> = parse_response("getUpdates", 200, body).unwrap();
        let events: Vec<_> = updates.into_iter().filter_map(Update::into_event).collect();

        assert_eq!(
            events,
            vec![
                InboundEvent::private(5, "/start"),
                InboundEvent::group(-100, "hello"),
                InboundEvent::private(5, ""),
            ]
        );
    }

    #[test]
    fn test_api_error_envelope() {
        let body = r#"{
            "ok": false,
            "error_code": 403,
            "description": "Forbidden: bot was blocked by the user"
        }"#;
        let err = parse_response::<Value>("sendMessage", 403, body).unwrap_err();
        assert!(matches!(
            err,
            BotError::Telegram { ref method, ref description }
                if method == "sendMessage" && description.starts_with("Forbidden")
        ));
    }

    #[test]
    fn test_non_json_error_body() {
        let err =
            parse_response::<Value>("getUpdates", 502, "<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(
            err,
            BotError::Telegram { ref description, .. } if description == "HTTP 502"
        ));

        let err = parse_response::<Value>("getUpdates", 200, "garbage").unwrap_err();
        assert!(matches!(err, BotError::JsonError(_)));
    }

    #[test]
    fn test_send_message_serialization() {
        let message = OutgoingMessage::html("<b>Main menu</b>").with_keyboard(Keyboard::Reply(vec![
            vec!["characters".to_string(), "guides".to_string()],
            vec!["faq".to_string()],
        ]));
        let wire = serde_json::to_value(send_message_request(ChatId(7), &message)).unwrap();

        assert_eq!(
            wire,
            json!({
                "chat_id": 7,
                "text": "<b>Main menu</b>",
                "parse_mode": "HTML",
                "reply_markup": {
                    "keyboard": [
                        [{"text": "characters"}, {"text": "guides"}],
                        [{"text": "faq"}]
                    ],
                    "resize_keyboard": true
                }
            })
        );
    }

    #[tokio::test]
    async fn test_client_over_http() {
        let server = MockServer::start_async().await;
        let updates = server
            .mock_async(|when, then| {
                when.method(POST).path("/bot123:abc/getUpdates");
                then.status(200).json_body(json!({"ok": true, "result": [
                    {"update_id": 7, "message": {
                        "message_id": 1, "chat": {"id": 42, "type": "private"}, "text": "/start"
                    }}
                ]}));
            })
            .await;
        let blocked = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/bot123:abc/sendMessage")
                    .json_body(json!({"chat_id": 42, "text": "hi"}));
                then.status(403).json_body(json!({
                    "ok": false,
                    "error_code": 403,
                    "description": "Forbidden: bot was blocked by the user"
                }));
            })
            .await;

        let client =
            TelegramClient::new(TelegramConfig::new("123:abc").with_api_base(server.base_url()))
                .unwrap();

        let received = client.get_updates(Some(7)).await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].update_id, 7);

        let err = client
            .send_message(ChatId(42), &OutgoingMessage::text("hi"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BotError::Telegram { ref method, ref description }
                if method == "sendMessage" && description.starts_with("Forbidden")
        ));
        assert!(!deliver(&client, ChatId(42), &OutgoingMessage::text("hi")).await);

        updates.assert_async().await;
        blocked.assert_hits_async(2).await;
    }

    #[test]
    fn test_keyboard_markups() {
        assert_eq!(reply_markup(&Keyboard::Remove), json!({"remove_keyboard": true}));
        assert_eq!(
            reply_markup(&Keyboard::Links(vec![LinkButton {
                label: "More details".to_string(),
                url: "https://heroes.example/lyra".to_string(),
            }])),
            json!({"inline_keyboard": [[
                {"text": "More details", "url": "https://heroes.example/lyra"}
            ]]})
        );

        let plain =
            serde_json::to_value(send_message_request(ChatId(1), &OutgoingMessage::text("hi")))
                .unwrap();
        assert_eq!(plain, json!({"chat_id": 1, "text": "hi"}));
    }

    struct SlowProvider;

    #[async_trait]
    impl LLMProvider for SlowProvider {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> herald_llm::Result<CompletionResponse> {
            tokio::time::sleep(Duration::from_secs(25)).await;
            Ok(CompletionResponse::new("Because dragons."))
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    fn hero_bot_with(sender: Arc<RecordingSender>, provider: Arc<dyn LLMProvider>) -> Arc<HeroBot> {
        let dispatcher = Dispatcher::new(
            Arc::new(default_menu_table().unwrap()),
            Arc::new(sample_catalog()),
        );
        let completer = FallbackCompleter::new(provider, FallbackSettings::default());
        Arc::new(HeroBot::new(sender, dispatcher, completer))
    }

    fn hero_bot(sender: Arc<RecordingSender>) -> Arc<HeroBot> {
        hero_bot_with(sender, Arc::new(CannedProvider::new(None)))
    }

    #[tokio::test]
    async fn test_poll_once_advances_offset_and_handles_in_order() {
        let mut source = MockUpdateSource::new();
        source
            .expect_get_updates()
            .withf(|offset| offset.is_none())
            .times(1)
            .returning(|_| {
                Ok(vec![
                    update(40, 1, "private", Some("characters")),
                    update(41, 2, "private", Some("faq")),
                    update(42, 1, "private", Some("classes")),
                ])
            });

        let sender = Arc::new(RecordingSender::default());
        let bot = hero_bot(sender.clone());
        let mut poller = TelegramPoller::new(Arc::new(source), bot.clone());

        let queued = poller.poll_once().await.unwrap();
        assert_eq!(queued, 3);
        assert_eq!(poller.offset(), Some(43));
        assert_eq!(poller.active_conversations(), 2);

        poller.shutdown().await;
        assert_eq!(bot.sessions().get(ChatId(1)).unwrap().state, MenuState::ClassesMenu);
        assert_eq!(bot.sessions().get(ChatId(2)).unwrap().state, MenuState::FaqMenu);
        assert_eq!(poller.active_conversations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_conversation_does_not_block_polling() {
        let mut source = MockUpdateSource::new();
        source
            .expect_get_updates()
            .withf(|offset| offset.is_none())
            .times(1)
            .returning(|_| {
                Ok(vec![
                    update(1, 1, "private", Some("ask")),
                    update(2, 1, "private", Some("why?")),
                ])
            });
        source
            .expect_get_updates()
            .withf(|offset| *offset == Some(3))
            .times(1)
            .returning(|_| Ok(vec![update(3, 2, "private", Some("faq"))]));

        let sender = Arc::new(RecordingSender::default());
        let bot = hero_bot_with(sender.clone(), Arc::new(SlowProvider));
        let mut poller = TelegramPoller::new(Arc::new(source), bot.clone());

        let start = tokio::time::Instant::now();
        assert_eq!(poller.poll_once().await.unwrap(), 2);
        assert_eq!(poller.poll_once().await.unwrap(), 1);
        assert!(start.elapsed() < Duration::from_secs(1));

        // Chat 2 is answered while chat 1 still waits on its completion
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(bot.sessions().get(ChatId(2)).unwrap().state, MenuState::FaqMenu);
        assert!(!sender.texts_for(2).is_empty());
        assert!(!sender.texts_for(1).iter().any(|t| t == "Because dragons."));

        poller.shutdown().await;
        assert_eq!(
            sender.texts_for(1).last().map(String::as_str),
            Some("Because dragons.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_worker_is_replaced() {
        let mut source = MockUpdateSource::new();
        source
            .expect_get_updates()
            .withf(|offset| offset.is_none())
            .times(1)
            .returning(|_| Ok(vec![update(1, 1, "private", Some("characters"))]));
        source
            .expect_get_updates()
            .withf(|offset| *offset == Some(2))
            .times(1)
            .returning(|_| Ok(vec![update(2, 1, "private", Some("classes"))]));

        let sender = Arc::new(RecordingSender::default());
        let bot = hero_bot(sender.clone());
        let mut poller = TelegramPoller::new(Arc::new(source), bot.clone());

        poller.poll_once().await.unwrap();
        tokio::time::sleep(Duration::from_secs(WORKER_IDLE_SECS + 1)).await;
        assert_eq!(poller.active_conversations(), 0);

        poller.poll_once().await.unwrap();
        assert_eq!(poller.active_conversations(), 1);
        poller.shutdown().await;
        assert_eq!(bot.sessions().get(ChatId(1)).unwrap().state, MenuState::ClassesMenu);
    }

    #[tokio::test]
    async fn test_poll_failure_keeps_offset() {
        let mut source = MockUpdateSource::new();
        source.expect_get_updates().returning(|_| {
            Err(BotError::Telegram {
                method: "getUpdates".to_string(),
                description: "Conflict".to_string(),
            })
        });

        let sender = Arc::new(RecordingSender::default());
        let mut poller = TelegramPoller::new(Arc::new(source), hero_bot(sender));

        assert!(poller.poll_once().await.is_err());
        assert_eq!(poller.offset(), None);
    }
}
