//! Bounded most-recent-first prediction history.

use std::collections::VecDeque;

use chempredict_core::types::HistoryEntry;

/// Maximum number of retained history entries.
pub const HISTORY_CAPACITY: usize = 5;

/// Insertion-ordered ring of the last few successful predictions.
///
/// Entries are never updated or individually removed; the oldest one falls
/// off when a new one pushes the store past capacity.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY + 1),
        }
    }

    /// Insert at the front. Returns the evicted entry, if any.
    pub fn append(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        self.entries.push_front(entry);
        if self.entries.len() > HISTORY_CAPACITY {
            let evicted = self.entries.pop_back();
            if let Some(ref old) = evicted {
                tracing::debug!(label = %old.compound_label, "History entry evicted");
            }
            return evicted;
        }
        None
    }

    /// Snapshot, most recent first.
    pub fn all(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
