//! Chord quality templates and pitch spelling.
//!
//! Output spelling is sharps-only; `note_name_to_midi` accepts both sharps
//! and flats. The asymmetry is deliberate and names are never respelled
//! against key context.

/// A chord quality: display suffix plus root-position interval pattern.
pub struct QualityPattern {
    pub suffix: &'static str,
    pub intervals: &'static [u8],
}

/// Recognized qualities, triads first, then sevenths, sixths/adds, ninths.
pub static QUALITIES: &[QualityPattern] = &[
    QualityPattern { suffix: "", intervals: &[0, 4, 7] },
    QualityPattern { suffix: "m", intervals: &[0, 3, 7] },
    QualityPattern { suffix: "dim", intervals: &[0, 3, 6] },
    QualityPattern { suffix: "aug", intervals: &[0, 4, 8] },
    QualityPattern { suffix: "sus4", intervals: &[0, 5, 7] },
    QualityPattern { suffix: "sus2", intervals: &[0, 2, 7] },
    QualityPattern { suffix: "7", intervals: &[0, 4, 7, 10] },
    QualityPattern { suffix: "maj7", intervals: &[0, 4, 7, 11] },
    QualityPattern { suffix: "m7", intervals: &[0, 3, 7, 10] },
    QualityPattern { suffix: "dim7", intervals: &[0, 3, 6, 9] },
    QualityPattern { suffix: "m7b5", intervals: &[0, 3, 6, 10] },
    QualityPattern { suffix: "aug7", intervals: &[0, 4, 8, 10] },
    QualityPattern { suffix: "7sus4", intervals: &[0, 5, 7, 10] },
    QualityPattern { suffix: "6", intervals: &[0, 4, 7, 9] },
    QualityPattern { suffix: "m6", intervals: &[0, 3, 7, 9] },
    QualityPattern { suffix: "add9", intervals: &[0, 4, 7, 14] },
    QualityPattern { suffix: "madd9", intervals: &[0, 3, 7, 14] },
    QualityPattern { suffix: "9", intervals: &[0, 4, 7, 10, 14] },
    QualityPattern { suffix: "maj9", intervals: &[0, 4, 7, 11, 14] },
    QualityPattern { suffix: "m9", intervals: &[0, 3, 7, 10, 14] },
];

const NOTE_NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

const NOTE_NAMES_FLAT: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Pitch classes conventionally spelled with flats in key names.
pub static FLAT_KEY_ROOTS: [u8; 6] = [1, 3, 5, 6, 8, 10];

/// Sharp spelling for a pitch class.
pub fn note_name(pitch_class: u8) -> &'static str {
    NOTE_NAMES_SHARP[(pitch_class % 12) as usize]
}

/// Flat spelling, used only for key roots.
pub fn flat_note_name(pitch_class: u8) -> &'static str {
    NOTE_NAMES_FLAT[(pitch_class % 12) as usize]
}

/// Octave-numbered label for a MIDI pitch: 60 → "C4".
pub fn note_label(pitch: u8) -> String {
    let octave = i32::from(pitch) / 12 - 1;
    format!("{}{}", note_name(pitch % 12), octave)
}

/// Comma-separated octave-numbered labels for a pitch list.
pub fn format_pitches(pitches: &[u8]) -> String {
    pitches
        .iter()
        .map(|&p| note_label(p))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve a note name (optionally with an octave digit) to a MIDI pitch.
///
/// Accepts sharps and flats. Without an octave the note lands in octave 4;
/// unknown names fall back to middle C.
pub fn note_name_to_midi(name: &str) -> u8 {
    let (letters, octave) = match name.chars().last() {
        Some(c) if c.is_ascii_digit() && name.len() >= 2 => {
            (&name[..name.len() - 1], c as i32 - '0' as i32)
        }
        _ => (name, 4),
    };

    let pitch_class = match letters {
        "C" => 0,
        "C#" | "Db" => 1,
        "D" => 2,
        "D#" | "Eb" => 3,
        "E" => 4,
        "F" => 5,
        "F#" | "Gb" => 6,
        "G" => 7,
        "G#" | "Ab" => 8,
        "A" => 9,
        "A#" | "Bb" => 10,
        "B" => 11,
        _ => {
            tracing::debug!(name, "unrecognized note name, defaulting to middle C");
            return 60;
        }
    };

    ((octave + 1) * 12 + pitch_class).clamp(0, 127) as u8
}

/// Split a chord symbol into `(root, quality)`, dropping any `/bass` part.
///
/// Matches the longest valid root spelling; an unparsable symbol gets a C
/// root and its full text as quality.
pub fn parse_chord_name(name: &str) -> (String, String) {
    const ROOTS: [&str; 17] = [
        "C#", "Db", "D#", "Eb", "F#", "Gb", "G#", "Ab", "A#", "Bb", "C", "D", "E", "F", "G",
        "A", "B",
    ];

    let (root, rest) = match ROOTS.iter().find(|root| name.starts_with(*root)) {
        Some(root) => (root.to_string(), &name[root.len()..]),
        None => ("C".to_string(), name),
    };

    let quality = match rest.find('/') {
        Some(slash) => &rest[..slash],
        None => rest,
    };

    (root, quality.to_string())
}

/// The bass note name of a slash chord, if present.
pub fn parse_chord_bass(name: &str) -> Option<&str> {
    name.split_once('/').map(|(_, bass)| bass).filter(|b| !b.is_empty())
}

/// Interval pattern for a quality suffix; unknown qualities read as major.
pub fn quality_intervals(quality: &str) -> &'static [u8] {
    // "ø" is an accepted alias for the half-diminished suffix.
    let quality = if quality == "ø" { "m7b5" } else { quality };

    QUALITIES
        .iter()
        .find(|pattern| pattern.suffix == quality)
        .map(|pattern| pattern.intervals)
        .unwrap_or(&[0, 4, 7])
}

/// Concrete pitches for a chord symbol with its root in `base_octave`.
///
/// A slash bass is placed one octave below the root and prepended when not
/// already present. Pitches beyond the MIDI range are dropped.
pub fn chord_notes_from_name(name: &str, base_octave: u8) -> Vec<u8> {
    let (root, quality) = parse_chord_name(name);
    let root_pitch = u32::from(note_name_to_midi(&root) % 12) + u32::from(base_octave) * 12;

    let mut notes: Vec<u8> = quality_intervals(&quality)
        .iter()
        .map(|&interval| root_pitch + u32::from(interval))
        .filter(|&pitch| pitch <= 127)
        .map(|pitch| pitch as u8)
        .collect();

    if let Some(bass_name) = parse_chord_bass(name) {
        let bass =
            u32::from(note_name_to_midi(bass_name) % 12) + u32::from(base_octave.saturating_sub(1)) * 12;
        if bass <= 127 && !notes.contains(&(bass as u8)) {
            notes.insert(0, bass as u8);
        }
    }

    notes
}
