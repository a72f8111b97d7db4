//! Standard MIDI File container codec.
//!
//! Parses and emits the SMF 1.0 byte format: "MThd" header, "MTrk" chunks,
//! big-endian integers, variable-length quantities, channel/meta/SysEx
//! events. Running status is accepted on read and resolved to explicit
//! status bytes in memory; the writer never re-collapses it, so output is
//! lossless for every event the reader accepts (at the price of slightly
//! larger files).

pub mod error;
pub mod event;
pub mod reader;
pub mod vlq;
pub mod writer;

pub use error::DecodeError;
pub use event::{MidiEvent, MidiFile, MidiTrack};
pub use reader::parse;
pub use writer::write;
