//! # Knowledge Store
//!
//! Append-only accumulator of facts discovered by agents, scoped to one
//! session. Entries are never reordered or removed once appended. The store
//! is owned exclusively by the session's orchestrator; agents only ever see
//! an immutable snapshot, so no locking is needed within a session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One fact discovered by an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Label of the agent that produced this entry
    pub source_agent: String,
    /// The discovered content (the agent's full output)
    pub content: String,
    /// When the entry was appended
    pub timestamp: DateTime<Utc>,
}

impl KnowledgeEntry {
    pub fn new(source_agent: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source_agent: source_agent.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Immutable view of the store at a point in time. Later appends do not
/// retroactively affect a snapshot already handed to a running agent.
pub type KnowledgeSnapshot = Arc<[KnowledgeEntry]>;

/// Per-session, append-only store of [`KnowledgeEntry`] values.
#[derive(Debug, Default)]
pub struct KnowledgeStore {
    entries: Vec<KnowledgeEntry>,
}

impl KnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Entries keep insertion order forever.
    pub fn append(&mut self, entry: KnowledgeEntry) {
        self.entries.push(entry);
    }

    /// Number of entries accumulated so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take an immutable snapshot of the current entries.
    pub fn snapshot(&self) -> KnowledgeSnapshot {
        self.entries.clone().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut store = KnowledgeStore::new();
        store.append(KnowledgeEntry::new("bio", "born 1912"));
        store.append(KnowledgeEntry::new("career", "worked at Bletchley Park"));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].source_agent, "bio");
        assert_eq!(snapshot[1].source_agent, "career");
    }

    #[test]
    fn test_snapshot_isolated_from_later_appends() {
        let mut store = KnowledgeStore::new();
        store.append(KnowledgeEntry::new("bio", "born 1912"));

        let snapshot = store.snapshot();
        store.append(KnowledgeEntry::new("career", "codebreaker"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }
}
