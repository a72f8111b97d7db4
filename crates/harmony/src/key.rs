use crate::templates::{
    flat_note_name, note_name, note_name_to_midi, parse_chord_name, FLAT_KEY_ROOTS,
};
use crate::types::{Chord, KeyMode, KeySignature};

const MAJOR_DEGREES: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
const MINOR_DEGREES: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

const MAJOR_QUALITIES: [&str; 7] = ["", "m", "m", "", "", "m", "dim"];
const MINOR_QUALITIES: [&str; 7] = ["m", "dim", "", "m", "m", "", ""];

/// Minimum score for a key to be reported at all.
const CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Build the key signature for a tonic pitch class and mode.
pub fn key_signature(tonic: u8, mode: KeyMode) -> KeySignature {
    let (degrees, qualities) = match mode {
        KeyMode::Major => (&MAJOR_DEGREES, &MAJOR_QUALITIES),
        KeyMode::Minor => (&MINOR_DEGREES, &MINOR_QUALITIES),
    };

    let mut scale = [0u8; 7];
    for (slot, &step) in degrees.iter().enumerate() {
        scale[slot] = (tonic + step) % 12;
    }

    let root = if FLAT_KEY_ROOTS.contains(&tonic) {
        flat_note_name(tonic)
    } else {
        note_name(tonic)
    };

    KeySignature {
        root: root.to_string(),
        mode,
        scale,
        diatonic: qualities.map(String::from),
    }
}

/// The 24 candidate keys: 12 major then 12 minor.
pub fn all_keys() -> Vec<KeySignature> {
    let mut keys = Vec::with_capacity(24);
    for tonic in 0..12u8 {
        keys.push(key_signature(tonic, KeyMode::Major));
    }
    for tonic in 0..12u8 {
        keys.push(key_signature(tonic, KeyMode::Minor));
    }
    keys
}

/// Score all 24 keys against the labelled chord list and return the best
/// if it clears the confidence threshold.
///
/// The base score is the fraction of chord notes inside the key's scale,
/// boosted for the mere presence of tonic/dominant/subdominant pitch
/// classes and again for chords that function as tonic, dominant, or
/// subdominant of the key.
pub fn detect_key(chords: &[Chord]) -> Option<KeySignature> {
    if chords.is_empty() {
        return None;
    }

    let mut histogram = [0u32; 12];
    for chord in chords {
        for &pitch in &chord.pitches {
            histogram[(pitch % 12) as usize] += 1;
        }
    }

    let total: u32 = histogram.iter().sum();
    if total == 0 {
        return None;
    }

    let labels: Vec<(u8, String)> = chords
        .iter()
        .map(|chord| {
            let (root, quality) = parse_chord_name(&chord.name);
            (note_name_to_midi(&root) % 12, quality)
        })
        .collect();

    let mut best: Option<(f64, KeySignature)> = None;

    for key in all_keys() {
        let tonic = key.tonic_pc();
        let dominant = (tonic + 7) % 12;
        let subdominant = (tonic + 5) % 12;

        let in_key: u32 = key.scale.iter().map(|&pc| histogram[pc as usize]).sum();
        let mut score = f64::from(in_key) / f64::from(total);

        if histogram[tonic as usize] > 0 {
            score *= 1.2;
        }
        if histogram[dominant as usize] > 0 {
            score *= 1.1;
        }
        if histogram[subdominant as usize] > 0 {
            score *= 1.05;
        }

        let is_major = key.mode == KeyMode::Major;
        let mut has_tonic_chord = false;
        let mut has_dominant_chord = false;
        let mut has_subdominant_chord = false;

        for (root, quality) in &labels {
            let quality = quality.as_str();
            if *root == tonic {
                has_tonic_chord |= tonic_family(is_major, quality);
            } else if *root == dominant {
                has_dominant_chord |= quality.is_empty() || quality == "7";
            } else if *root == subdominant {
                has_subdominant_chord |= subdominant_family(is_major, quality);
            }
        }

        if has_tonic_chord {
            score *= 1.3;
        }
        if has_dominant_chord {
            score *= 1.2;
        }
        if has_subdominant_chord {
            score *= 1.1;
        }

        if best.as_ref().map(|(s, _)| score > *s).unwrap_or(true) {
            best = Some((score, key));
        }
    }

    best.filter(|(score, _)| *score >= CONFIDENCE_THRESHOLD)
        .map(|(_, key)| key)
}

fn tonic_family(is_major: bool, quality: &str) -> bool {
    if is_major {
        matches!(quality, "" | "maj7" | "6")
    } else {
        matches!(quality, "m" | "m7")
    }
}

fn subdominant_family(is_major: bool, quality: &str) -> bool {
    if is_major {
        matches!(quality, "" | "maj7")
    } else {
        matches!(quality, "m" | "m7")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(name: &str, pitches: Vec<u8>) -> Chord {
        Chord {
            pitches,
            onset: 0,
            duration: 480,
            name: name.to_string(),
            original_pitches: None,
            original_name: None,
        }
    }

    #[test]
    fn empty_chord_list_has_no_key() {
        assert!(detect_key(&[]).is_none());
    }

    #[test]
    fn one_four_five_in_c_detects_c_major() {
        let chords = vec![
            chord("C", vec![60, 64, 67]),
            chord("F", vec![65, 69, 72]),
            chord("G", vec![67, 71, 74]),
        ];

        let key = detect_key(&chords).expect("key");
        assert_eq!(key.root, "C");
        assert_eq!(key.mode, KeyMode::Major);
    }

    #[test]
    fn minor_chords_detect_a_minor() {
        let chords = vec![
            chord("Am", vec![57, 60, 64]),
            chord("Dm", vec![62, 65, 69]),
            chord("Em", vec![64, 67, 71]),
        ];

        let key = detect_key(&chords).expect("key");
        assert_eq!(key.name(), "Am");
    }

    #[test]
    fn flat_roots_are_spelled_flat() {
        let chords = vec![
            chord("D#", vec![63, 67, 70]),
            chord("G#", vec![68, 72, 75]),
            chord("A#", vec![70, 74, 77]),
        ];

        let key = detect_key(&chords).expect("key");
        assert_eq!(key.root, "Eb");
        assert_eq!(key.mode, KeyMode::Major);
    }

    #[test]
    fn major_key_signature_contents() {
        let key = key_signature(7, KeyMode::Major);
        assert_eq!(key.root, "G");
        assert_eq!(key.scale, [7, 9, 11, 0, 2, 4, 6]);
        assert_eq!(key.diatonic[0], "");
        assert_eq!(key.diatonic[1], "m");
        assert_eq!(key.diatonic[6], "dim");
    }

    #[test]
    fn minor_key_signature_contents() {
        let key = key_signature(9, KeyMode::Minor);
        assert_eq!(key.name(), "Am");
        assert_eq!(key.scale, [9, 11, 0, 2, 4, 5, 7]);
        assert_eq!(key.diatonic[0], "m");
        assert_eq!(key.diatonic[1], "dim");
        assert_eq!(key.diatonic[2], "");
    }

    #[test]
    fn twenty_four_candidate_keys() {
        let keys = all_keys();
        assert_eq!(keys.len(), 24);
        assert_eq!(keys.iter().filter(|k| k.mode == KeyMode::Major).count(), 12);
    }
}
