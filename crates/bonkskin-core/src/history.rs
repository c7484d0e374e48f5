//! Snapshot-based undo/redo history.
//!
//! Every mutating editor action pushes a full serialized copy of the scene.
//! History is linear: pushing after an undo discards the redo branch, and the
//! oldest entry is evicted once the configured depth is exceeded.

use serde::{Deserialize, Serialize};

/// Default maximum number of history entries.
pub const DEFAULT_MAX_HISTORY: usize = 30;

/// An opaque, self-contained serialized scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn new(json: impl Into<String>) -> Self {
        Self(json.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Bounded linear history with a cursor on the live entry.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    /// Index of the live entry; `None` while empty.
    cursor: Option<usize>,
    max_entries: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl History {
    /// Create an empty history holding at most `max_entries` (at least one).
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            max_entries: max_entries.max(1),
        }
    }

    /// Record a new live entry, discarding everything after the cursor.
    pub fn push(&mut self, snapshot: Snapshot) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(snapshot);

        if self.entries.len() > self.max_entries {
            self.entries.remove(0);
        }
        self.cursor = Some(self.entries.len() - 1);

        log::debug!(
            "History push: {} entries, cursor {}",
            self.entries.len(),
            self.entries.len() - 1
        );
    }

    /// Step back. Returns the entry to restore, or `None` at the start.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        let cursor = self.cursor.filter(|&c| c > 0)?;
        self.cursor = Some(cursor - 1);
        self.entries.get(cursor - 1)
    }

    /// Step forward. Returns the entry to restore, or `None` at the end.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let cursor = self.cursor.filter(|&c| c + 1 < self.entries.len())?;
        self.cursor = Some(cursor + 1);
        self.entries.get(cursor + 1)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
