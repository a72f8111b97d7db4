//! Chord analysis and transformation over decoded MIDI.
//!
//! The pipeline runs aggregation (events → timed notes), segmentation
//! (notes → onset-aligned chords), and naming (interval-vector lookup),
//! then offers voice-leading-aware transforms plus key and progression
//! detection over the labelled chord list. Everything here is pure: the
//! owning document lives in the `reharm` crate.

pub mod aggregate;
pub mod identify;
pub mod key;
pub mod progression;
pub mod segment;
pub mod templates;
pub mod transform;
pub mod types;
pub mod voicing;

pub use aggregate::extract_notes;
pub use identify::{identify_chord, interval_vector};
pub use key::{all_keys, detect_key, key_signature};
pub use progression::{ProgressionAnalyzer, ProgressionPattern};
pub use segment::{detect_chords, DEFAULT_TIME_TOLERANCE};
pub use templates::{
    chord_notes_from_name, format_pitches, note_label, note_name, note_name_to_midi,
    parse_chord_name,
};
pub use transform::{switched_tonality, transform_chord};
pub use types::{
    Chord, KeyMode, KeySignature, Note, ProgressionMatch, TransformationOptions,
    TransformationType, VoiceLeadingOptions, VoiceMovement,
};
pub use voicing::{has_parallel_motion, VoiceLeader};
