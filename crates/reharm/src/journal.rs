//! Action journal: bounded undo/redo history of chord transformations.
//!
//! Snapshots are deep copies of chord values, never references into the
//! live chord list, so the journal can outlive any individual edit.

use chrono::{DateTime, Utc};
use harmony::Chord;
use serde::{Deserialize, Serialize};

/// Default cap on retained actions.
pub const DEFAULT_JOURNAL_CAP: usize = 50;

/// One recorded transformation: which chords changed, and their full
/// values before and after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub indices: Vec<usize>,
    pub before: Vec<Chord>,
    pub after: Vec<Chord>,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl Action {
    pub fn new(
        indices: Vec<usize>,
        before: Vec<Chord>,
        after: Vec<Chord>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            indices,
            before,
            after,
            description: description.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Bounded action list plus a cursor.
///
/// The cursor points at the next-to-redo position: actions before it are
/// undoable, actions from it onward are redoable.
#[derive(Debug)]
pub struct ActionJournal {
    actions: Vec<Action>,
    cursor: usize,
    cap: usize,
}

impl Default for ActionJournal {
    fn default() -> Self {
        Self::with_cap(DEFAULT_JOURNAL_CAP)
    }
}

impl ActionJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            actions: Vec::new(),
            cursor: 0,
            cap: cap.max(1),
        }
    }

    /// Append an action, discarding any redoable tail and, at the cap, the
    /// oldest entry.
    pub fn record(&mut self, action: Action) {
        self.actions.truncate(self.cursor);
        self.actions.push(action);
        self.cursor = self.actions.len();

        if self.actions.len() > self.cap {
            self.actions.remove(0);
            self.cursor -= 1;
        }
    }

    /// Step the cursor back and hand out the action to revert.
    pub fn undo(&mut self) -> Option<&Action> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.actions.get(self.cursor)
    }

    /// Hand out the action to re-apply and step the cursor forward.
    pub fn redo(&mut self) -> Option<&Action> {
        if self.cursor >= self.actions.len() {
            return None;
        }
        self.cursor += 1;
        self.actions.get(self.cursor - 1)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.actions.len()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.actions.get(i))
            .map(|a| a.description.as_str())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.actions.get(self.cursor).map(|a| a.description.as_str())
    }

    pub fn clear(&mut self) {
        self.actions.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
