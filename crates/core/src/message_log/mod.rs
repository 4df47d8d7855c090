use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Rendering-ready summary of a single event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub text: String,
}

impl LogEntry {
    pub fn new(timestamp: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            text: text.into(),
        }
    }

    /// The line as it appears in the message panel.
    pub fn display_line(&self) -> String {
        format!("{} {}", self.timestamp, self.text)
    }
}

/// Bounded FIFO of [`LogEntry`] values. Appending past capacity evicts the
/// oldest entry, so the log never holds more than `capacity` items.
#[derive(Debug, Clone)]
pub struct MessageLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl MessageLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn append(&mut self, entry: LogEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// The last `k` entries (or fewer) in arrival order. Each call yields a
    /// fresh iterator and leaves the log untouched.
    pub fn recent(&self, k: usize) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        let skip = self.entries.len().saturating_sub(k);
        self.entries.iter().skip(skip)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::with_capacity(20)
    }
}
