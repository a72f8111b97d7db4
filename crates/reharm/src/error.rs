use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by document operations.
///
/// Decode errors abort a load and leave the document in its previous
/// state. Key and progression detection never raise; an unconfident key is
/// an absent value, not an error.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cannot access {path}: {source}")]
    IoUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Decode(#[from] smf::DecodeError),

    #[error("chord index {index} out of range ({len} chords)")]
    OutOfRange { index: usize, len: usize },

    #[error("no MIDI file loaded")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, DocumentError>;
