//! Per-conversation dialog sessions
//!
//! Sessions live in memory only. Each one is owned by the task handling its
//! conversation; the store is shared behind an `RwLock`.

use crate::dialog::{MenuState, SearchHistory};
use crate::error::{BotError, Result};
use crate::interface::ChatId;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Default idle time before a session is discarded
pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone)]
pub struct DialogSession {
    pub chat_id: ChatId,
    pub state: MenuState,
    pub history: SearchHistory,
    /// Hero names shown by the latest successful search
    pub last_results: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl DialogSession {
    pub fn new(chat_id: ChatId, history_limit: usize) -> Self {
        let now = Utc::now();
        Self {
            chat_id,
            state: MenuState::MainMenu,
            history: SearchHistory::with_limit(history_limit),
            last_results: Vec::new(),
            created_at: now,
            last_active: now,
        }
    }

    pub fn update_activity(&mut self) {
        self.last_active = Utc::now();
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        Utc::now() - self.last_active > ttl
    }

    /// Back to the main menu; search history is kept
    pub fn reset(&mut self) {
        self.state = MenuState::MainMenu;
        self.last_results.clear();
        self.update_activity();
    }
}

pub trait SessionStorage: Send + Sync {
    fn get(&self, chat_id: ChatId) -> Option<DialogSession>;
    fn set(&self, session: DialogSession) -> Result<()>;
    fn delete(&self, chat_id: ChatId) -> bool;
    fn cleanup_expired(&self, ttl: Duration) -> usize;
    fn len(&self) -> usize;
}

#[derive(Default)]
pub struct InMemoryStorage {
    sessions: RwLock<HashMap<ChatId, DialogSession>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for InMemoryStorage {
    fn get(&self, chat_id: ChatId) -> Option<DialogSession> {
        self.sessions.read().ok()?.get(&chat_id).cloned()
    }

    fn set(&self, session: DialogSession) -> Result<()> {
        self.sessions
            .write()
            .map_err(|e| BotError::SessionError(format!("Lock error: {e}")))?
            .insert(session.chat_id, session);
        Ok(())
    }

    fn delete(&self, chat_id: ChatId) -> bool {
        self.sessions
            .write()
            .ok()
            .and_then(|mut sessions| sessions.remove(&chat_id))
            .is_some()
    }

    fn cleanup_expired(&self, ttl: Duration) -> usize {
        let Ok(mut sessions) = self.sessions.write() else {
            return 0;
        };

        let initial_count = sessions.len();
        sessions.retain(|_, session| !session.is_expired(ttl));
        initial_count - sessions.len()
    }

    fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or_default()
    }
}

/// Session lookup with idle expiry
pub struct SessionManager {
    storage: Arc<dyn SessionStorage>,
    ttl: Duration,
    history_limit: usize,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_storage(Arc::new(InMemoryStorage::new()))
    }

    pub fn with_storage(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
            history_limit: crate::dialog::DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_ttl(mut self, ttl_seconds: i64) -> Self {
        self.ttl = Duration::seconds(ttl_seconds);
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Existing live session, or a fresh one at the main menu
    pub fn get_or_create(&self, chat_id: ChatId) -> Result<DialogSession> {
        if let Some(mut session) = self.storage.get(chat_id) {
            if !session.is_expired(self.ttl) {
                session.update_activity();
                return Ok(session);
            }
            debug!(%chat_id, "Session expired, starting over");
        }

        let session = DialogSession::new(chat_id, self.history_limit);
        self.storage.set(session.clone())?;
        Ok(session)
    }

    pub fn get(&self, chat_id: ChatId) -> Option<DialogSession> {
        self.storage.get(chat_id)
    }

    pub fn update(&self, mut session: DialogSession) -> Result<()> {
        session.update_activity();
        self.storage.set(session)
    }

    /// Reset a conversation to the main menu and store it
    pub fn reset(&self, chat_id: ChatId) -> Result<DialogSession> {
        let mut session = self.get_or_create(chat_id)?;
        session.reset();
        self.storage.set(session.clone())?;
        Ok(session)
    }

    pub fn delete(&self, chat_id: ChatId) -> bool {
        self.storage.delete(chat_id)
    }

    pub fn cleanup_expired(&self) -> usize {
        self.storage.cleanup_expired(self.ttl)
    }

    pub fn active_count(&self) -> usize {
        self.storage.len()
    }
}
