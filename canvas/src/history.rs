//! Linear undo history of document snapshots.
//!
//! Callers record the state *before* each committed change; `undo` hands back
//! the most recent one. Oldest entries are dropped once the cap is reached.
//! There is no redo.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use crate::consts::HISTORY_LIMIT;

/// Capped stack of snapshots.
#[derive(Debug, Clone)]
pub struct UndoHistory<T: Clone> {
    stack: VecDeque<T>,
    limit: usize,
}

impl<T: Clone> Default for UndoHistory<T> {
    fn default() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }
}

impl<T: Clone> UndoHistory<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// History keeping at most `limit` snapshots (at least one).
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        Self { stack: VecDeque::with_capacity(limit), limit }
    }

    /// Push a snapshot, evicting the oldest when full.
    pub fn record(&mut self, snapshot: T) {
        if self.stack.len() == self.limit {
            self.stack.pop_front();
        }
        self.stack.push_back(snapshot);
    }

    /// Pop the most recent snapshot.
    pub fn undo(&mut self) -> Option<T> {
        self.stack.pop_back()
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.stack.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }
}
