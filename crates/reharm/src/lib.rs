//! Chord-rewriting document engine.
//!
//! Ties the `smf` codec and `harmony` analysis together into a document
//! context: load an SMF, inspect and transform its detected chords with
//! undo/redo, and save the edited result as a new SMF. Chord detection is
//! memoized per file content in a process-wide cache.

pub mod cache;
pub mod document;
pub mod error;
pub mod journal;
pub mod rewrite;

pub use cache::{ContentHash, DetectionCache};
pub use document::{Document, TransformReport};
pub use error::{DocumentError, Result};
pub use journal::{Action, ActionJournal, DEFAULT_JOURNAL_CAP};
