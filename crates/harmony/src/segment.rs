//! Chord segmentation: group notes into onset-aligned chords.

use std::collections::HashMap;

use crate::identify::identify_chord;
use crate::types::{Chord, Note};

/// Default onset tolerance in ticks.
pub const DEFAULT_TIME_TOLERANCE: u32 = 120;

/// Group notes into chords within `tolerance` ticks of a shared anchor.
///
/// Each note joins the first existing anchor within the tolerance or opens
/// a new anchor at its own onset. Anchors with fewer than three distinct
/// pitches are dropped. Duration runs to the next anchor; the final anchor
/// takes the longest duration among its member notes.
pub fn detect_chords(notes: &[Note], tolerance: u32) -> Vec<Chord> {
    if notes.is_empty() {
        return Vec::new();
    }

    let mut anchors: Vec<u32> = Vec::new();
    let mut members: HashMap<u32, Vec<u8>> = HashMap::new();

    for note in notes {
        match anchors
            .iter()
            .find(|&&anchor| note.onset.abs_diff(anchor) <= tolerance)
        {
            Some(&anchor) => members.entry(anchor).or_default().push(note.pitch),
            None => {
                anchors.push(note.onset);
                members.insert(note.onset, vec![note.pitch]);
            }
        }
    }

    anchors.sort_unstable();

    let mut chords = Vec::new();
    for (i, &anchor) in anchors.iter().enumerate() {
        let mut pitches = members.remove(&anchor).unwrap_or_default();
        pitches.sort_unstable();
        pitches.dedup();

        if pitches.len() < 3 {
            continue;
        }

        let duration = match anchors.get(i + 1) {
            Some(&next) => next - anchor,
            None => notes
                .iter()
                .filter(|note| note.onset.abs_diff(anchor) <= tolerance)
                .map(|note| note.duration)
                .max()
                .unwrap_or(0),
        };

        let name = identify_chord(&pitches);
        chords.push(Chord {
            pitches,
            onset: anchor,
            duration,
            name,
            original_pitches: None,
            original_name: None,
        });
    }

    chords
}
