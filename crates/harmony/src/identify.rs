//! Chord naming from an ascending pitch list.

use crate::templates::{format_pitches, note_name, QUALITIES};

/// Semitone offsets of each pitch above the lowest, sorted.
pub fn interval_vector(pitches: &[u8]) -> Vec<u8> {
    let Some(&lowest) = pitches.iter().min() else {
        return Vec::new();
    };

    let mut intervals: Vec<u8> = pitches.iter().map(|&p| p - lowest).collect();
    intervals.sort_unstable();
    intervals
}

/// Name a chord from its pitches.
///
/// Root-position template match gives `{root}{quality}`; a rotated match
/// gives `{root}{quality}/{bass}`; anything else falls back to the bass
/// letter plus the octave-numbered note list.
pub fn identify_chord(pitches: &[u8]) -> String {
    if pitches.len() < 3 {
        return "N/A".to_string();
    }

    let intervals = interval_vector(pitches);
    let bass = *pitches.iter().min().expect("non-empty pitch list");
    let bass_name = note_name(bass % 12);

    for quality in QUALITIES {
        if intervals == quality.intervals {
            return format!("{}{}", bass_name, quality.suffix);
        }
    }

    // Inversions: raise the lowest k template entries an octave, re-sort,
    // and compare re-zeroed. The chord root is the template degree that
    // became the bass.
    for quality in QUALITIES {
        let pattern = quality.intervals;
        if pattern.len() != intervals.len() {
            continue;
        }

        for k in 1..pattern.len() {
            let mut rotated: Vec<u8> = pattern
                .iter()
                .enumerate()
                .map(|(i, &interval)| if i < k { interval + 12 } else { interval })
                .collect();
            rotated.sort_unstable();
            let base = rotated[0];
            for interval in &mut rotated {
                *interval -= base;
            }

            if rotated == intervals {
                let root_pc = (i32::from(bass) - i32::from(pattern[k])).rem_euclid(12) as u8;
                return format!(
                    "{}{}/{}",
                    note_name(root_pc),
                    quality.suffix,
                    bass_name
                );
            }
        }
    }

    format!("{} ({})", bass_name, format_pitches(pitches))
}
