use std::collections::VecDeque;

/// One previously observed decoded sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub text: String,
    /// Local wall-clock time of observation, formatted `HH:MM:SS`.
    pub timestamp: String,
}

/// Bounded, most-recent-first list of observed non-empty sentences.
///
/// Entries are created on observation and never mutated; only capacity
/// evicts them (oldest first).
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a sentence observed on a poll tick. Empty sentences are
    /// ignored. Returns `true` if an entry was recorded.
    pub fn observe(&mut self, sentence: &str, timestamp: &str) -> bool {
        if sentence.is_empty() {
            return false;
        }
        self.entries.push_front(HistoryEntry {
            text: sentence.to_string(),
            timestamp: timestamp.to_string(),
        });
        self.entries.truncate(self.capacity);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries newest-first, as displayed.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }
}
