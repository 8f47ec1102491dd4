//! Timed broadcasts
//!
//! A [`Broadcaster`] waits an initial delay, then every interval asks its
//! [`BroadcastSource`] for a body and sends it to each destination. Delivery
//! is independent per destination: one failing chat never stops the others
//! or the next cycle.

pub mod facts;

use crate::error::BotError;
use crate::interface::{ChatId, MessageSender, OutgoingMessage, deliver};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub use facts::FactOfTheDay;

/// One broadcast target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub chat_id: ChatId,
    /// Sent instead of the shared body when set
    pub text_override: Option<String>,
}

impl Destination {
    pub fn new(chat_id: i64) -> Self {
        Self {
            chat_id: ChatId(chat_id),
            text_override: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text_override = Some(text.into());
        self
    }
}

impl FromStr for Destination {
    type Err = BotError;

    /// `id` or `id=text`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, text) = match s.split_once('=') {
            Some((id, text)) => (id, Some(text.trim())),
            None => (s, None),
        };
        let chat_id: ChatId = id
            .parse()
            .map_err(|e| BotError::ConfigError(format!("Invalid chat id '{}': {e}", id.trim())))?;

        Ok(Self {
            chat_id,
            text_override: text.filter(|t| !t.is_empty()).map(str::to_string),
        })
    }
}

/// Produces the body of one broadcast cycle
#[async_trait]
pub trait BroadcastSource: Send + Sync {
    /// Body for this cycle; `None` skips destinations without an override
    async fn body(&self) -> Option<String>;

    fn name(&self) -> &str;
}

/// Fixed text every cycle
#[derive(Debug, Clone)]
pub struct StaticMessage {
    text: String,
}

impl StaticMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl BroadcastSource for StaticMessage {
    async fn body(&self) -> Option<String> {
        Some(self.text.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Initial delay, then a fixed interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub initial_delay: Duration,
    pub interval: Duration,
}

impl Schedule {
    pub fn new(initial_delay: Duration, interval: Duration) -> Self {
        Self {
            initial_delay,
            interval,
        }
    }

    /// 60 s delay, 30 s interval
    pub fn broadcast_default() -> Self {
        Self::new(Duration::from_secs(60), Duration::from_secs(30))
    }

    /// 60 s delay, daily interval
    pub fn daily_default() -> Self {
        Self::new(Duration::from_secs(60), Duration::from_secs(86_400))
    }
}

/// Outcome of one cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub delivered: usize,
    pub failed: usize,
    /// Destinations with no text to send this cycle
    pub skipped: usize,
}

pub struct Broadcaster {
    sender: Arc<dyn MessageSender>,
    destinations: Vec<Destination>,
    source: Arc<dyn BroadcastSource>,
    schedule: Schedule,
}

impl Broadcaster {
    pub fn new(
        sender: Arc<dyn MessageSender>,
        destinations: Vec<Destination>,
        source: Arc<dyn BroadcastSource>,
        schedule: Schedule,
    ) -> Self {
        Self {
            sender,
            destinations,
            source,
            schedule,
        }
    }

    pub fn destinations(&self) -> &[Destination] {
        &self.destinations
    }

    /// Send one round to every destination
    pub async fn run_cycle(&self) -> CycleReport {
        let body = self.source.body().await;
        let mut report = CycleReport::default();

        for destination in &self.destinations {
            let Some(text) = destination.text_override.as_deref().or(body.as_deref()) else {
                report.skipped += 1;
                continue;
            };

            let message = OutgoingMessage::text(text);
            if deliver(self.sender.as_ref(), destination.chat_id, &message).await {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }

        report
    }

    /// Run until the process stops
    pub async fn run(&self) {
        self.run_with_limit(None).await;
    }

    /// Run `cycles` rounds, or forever when `None`
    pub async fn run_with_limit(&self, cycles: Option<usize>) -> Vec<CycleReport> {
        let mut reports = Vec::new();
        if self.destinations.is_empty() {
            warn!(source = self.source.name(), "No broadcast destinations configured");
            return reports;
        }

        info!(
            source = self.source.name(),
            destinations = self.destinations.len(),
            initial_delay_secs = self.schedule.initial_delay.as_secs(),
            interval_secs = self.schedule.interval.as_secs(),
            "Broadcast scheduled"
        );
        tokio::time::sleep(self.schedule.initial_delay).await;

        loop {
            let report = self.run_cycle().await;
            info!(
                source = self.source.name(),
                delivered = report.delivered,
                failed = report.failed,
                skipped = report.skipped,
                "Broadcast cycle finished"
            );
            reports.push(report);

            if cycles.is_some_and(|limit| reports.len() >= limit) {
                return reports;
            }
            tokio::time::sleep(self.schedule.interval).await;
        }
    }
}
