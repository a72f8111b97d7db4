use thiserror::Error;

/// Errors raised while decoding SMF bytes.
///
/// Every variant carries the byte offset where decoding gave up. Unknown
/// channel status is *not* an error: the parser reports it and resyncs to
/// the next status byte.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed header at byte {offset}: {detail}")]
    MalformedHeader { offset: usize, detail: &'static str },

    #[error("track data truncated at byte {offset}")]
    TruncatedTrack { offset: usize },

    #[error("variable-length quantity exceeds 4 bytes at byte {offset}")]
    InvalidVlq { offset: usize },
}
