use std::collections::VecDeque;
use std::sync::Arc;

use crate::{FilterState, Raster, TransformState};

pub const HISTORY_CAPACITY: usize = 10;

/// Everything needed to bring the editor back to a committed point.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pub rendered: Arc<Raster>,
    pub filters: FilterState,
    pub transform: TransformState,
    pub source: Arc<Raster>,
}

/// Bounded linear history with a cursor. Committing after an undo discards
/// the entries past the cursor; there is no redo.
#[derive(Debug, Clone)]
pub struct History<T = HistorySnapshot> {
    entries: VecDeque<T>,
    cursor: Option<usize>,
    capacity: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl<T> History<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            cursor: None,
            capacity: capacity.max(1),
        }
    }

    pub fn commit(&mut self, entry: T) {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }
        self.entries.push_back(entry);
        let mut cursor = self.entries.len() - 1;

        if self.entries.len() > self.capacity {
            self.entries.pop_front();
            cursor -= 1;
        }
        self.cursor = Some(cursor);
    }

    /// Steps the cursor back one entry and returns it; `None` at the start.
    pub fn undo(&mut self) -> Option<&T> {
        let cursor = self.cursor.filter(|cursor| *cursor > 0)? - 1;
        self.cursor = Some(cursor);
        self.entries.get(cursor)
    }

    /// Moves the cursor to the first entry. The entries after it stay until
    /// the next commit truncates them.
    pub fn reset_to_first(&mut self) -> Option<&T> {
        if self.entries.is_empty() {
            return None;
        }
        self.cursor = Some(0);
        self.entries.front()
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor > 0)
    }

    pub fn current(&self) -> Option<&T> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
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

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}
