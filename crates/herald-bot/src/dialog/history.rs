//! Per-conversation search history
//!
//! Keeps the most recent hero search queries for one conversation. The buffer
//! is bounded: once full, the oldest query is evicted first.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

/// Default number of queries kept per conversation
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// A single search submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchEntry {
    /// Trimmed query text
    pub query: String,
    /// When the query was submitted
    pub timestamp: DateTime<Utc>,
}

impl SearchEntry {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Bounded, ordered list of search queries
#[derive(Debug, Clone)]
pub struct SearchHistory {
    entries: VecDeque<SearchEntry>,
    limit: usize,
}

impl Default for SearchHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchHistory {
    /// Create a history with the default bound
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create a history keeping at most `limit` queries
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Append a query, evicting the oldest ones past the bound
    ///
    /// Blank queries are ignored and `false` is returned.
    pub fn record(&mut self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return false;
        }

        self.entries.push_back(SearchEntry::new(query));
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        true
    }

    /// Queries in submission order, oldest first
    pub fn queries(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.query.as_str()).collect()
    }

    pub fn entries(&self) -> &VecDeque<SearchEntry> {
        &self.entries
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_order() {
        let mut history = SearchHistory::new();
        history.record("Dragon");
        history.record("  Mage ");

        assert_eq!(history.queries(), vec!["Dragon", "Mage"]);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_blank_queries_are_ignored() {
        let mut history = SearchHistory::new();
        assert!(!history.record(""));
        assert!(!history.record("   "));
        assert!(history.is_empty());
    }

    #[test]
    fn test_history_limit_evicts_oldest() {
        let mut history = SearchHistory::with_limit(3);

        for i in 0..5 {
            history.record(&format!("Query {i}"));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.queries(), vec!["Query 2", "Query 3", "Query 4"]);
    }

    #[test]
    fn test_zero_limit_keeps_latest() {
        let mut history = SearchHistory::with_limit(0);
        history.record("a");
        history.record("b");
        assert_eq!(history.queries(), vec!["b"]);
    }

    #[test]
    fn test_clear() {
        let mut history = SearchHistory::new();
        history.record("Test");
        history.clear();
        assert!(history.is_empty());
    }
}
