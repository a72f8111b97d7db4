//! Parametric chord transformation modes.

use crate::templates::{chord_notes_from_name, parse_chord_name};
use crate::types::{TransformationOptions, TransformationType};
use crate::voicing::VoiceLeader;

/// Base octave for resolving target chord names before voicing.
const TARGET_OCTAVE: u8 = 4;

/// Directional quality flips for tonality switching.
static TONALITY_SWITCH: &[(&str, &str)] = &[
    ("", "m"),
    ("m", ""),
    ("dim", "m"),
    ("aug", ""),
    ("7", "m7"),
    ("maj7", "m7"),
    ("m7", "maj7"),
    ("dim7", "m7b5"),
    ("m7b5", "dim7"),
    ("9", "m9"),
    ("maj9", "m9"),
    ("m9", "maj9"),
    ("6", "m6"),
    ("m6", "6"),
    ("add9", "madd9"),
    ("madd9", "add9"),
];

/// Flip a chord symbol across the major/minor divide, if its quality has a
/// mapping.
pub fn switched_tonality(name: &str) -> Option<String> {
    let (root, quality) = parse_chord_name(name);
    TONALITY_SWITCH
        .iter()
        .find(|(from, _)| *from == quality)
        .map(|(_, to)| format!("{root}{to}"))
}

/// Compute the new pitches for `current` transformed toward `target_name`.
///
/// The result is always ascending, deduplicated, and clamped to the MIDI
/// range.
pub fn transform_chord(
    leader: &VoiceLeader,
    current: &[u8],
    target_name: &str,
    options: &TransformationOptions,
) -> Vec<u8> {
    let target = chord_notes_from_name(target_name, TARGET_OCTAVE);

    let pitches: Vec<i32> = match options.mode {
        TransformationType::Standard => {
            if options.use_voice_leading {
                widen(leader.find_optimal_voicing(&target, current))
            } else {
                shift_to_octave(&target, current)
            }
        }
        TransformationType::Inversion => {
            let mut inverted = target.clone();
            inverted.sort_unstable();
            let k = options.inversion.min(inverted.len().saturating_sub(1));
            let mut inverted: Vec<i32> = inverted.iter().map(|&p| i32::from(p)).collect();
            for pitch in inverted.iter_mut().take(k) {
                *pitch += 12;
            }
            inverted.sort_unstable();

            if options.use_voice_leading {
                let inverted: Vec<u8> =
                    inverted.iter().map(|&p| p.clamp(0, 127) as u8).collect();
                widen(leader.find_optimal_voicing(&inverted, current))
            } else {
                let inverted: Vec<u8> =
                    inverted.iter().map(|&p| p.clamp(0, 127) as u8).collect();
                shift_to_octave(&inverted, current)
            }
        }
        TransformationType::Percentage => {
            let percentage = options.percentage.clamp(0.0, 100.0);
            let led = leader.find_optimal_voicing(&target, current);

            pair_voices(current, &led)
                .into_iter()
                .map(|(voice, goal)| {
                    let from = f64::from(voice);
                    let to = f64::from(goal);
                    (from + (to - from) * percentage / 100.0).round() as i32
                })
                .collect()
        }
        // The quality flip happens in the target name; placement is plain
        // voice leading.
        TransformationType::SwitchTonality => {
            widen(leader.find_optimal_voicing(&target, current))
        }
    };

    finalize(pitches)
}

fn widen(pitches: Vec<u8>) -> Vec<i32> {
    pitches.into_iter().map(i32::from).collect()
}

/// Place the target so its lowest pitch shares the current bass octave.
fn shift_to_octave(target: &[u8], current: &[u8]) -> Vec<i32> {
    let (Some(&current_low), Some(&target_low)) = (current.iter().min(), target.iter().min())
    else {
        return widen(target.to_vec());
    };

    let shift = (i32::from(current_low) / 12 - i32::from(target_low) / 12) * 12;
    target.iter().map(|&p| i32::from(p) + shift).collect()
}

/// Pair each current voice with its nearest target pitch, then attach any
/// target pitch left unclaimed to its nearest current voice.
fn pair_voices(current: &[u8], target: &[u8]) -> Vec<(u8, u8)> {
    if current.len() == target.len() {
        return current.iter().copied().zip(target.iter().copied()).collect();
    }

    let mut pairs: Vec<(u8, u8)> = current
        .iter()
        .map(|&voice| {
            let closest = target
                .iter()
                .copied()
                .min_by_key(|&w| (i32::from(w) - i32::from(voice)).abs())
                .unwrap_or(voice);
            (voice, closest)
        })
        .collect();

    for &goal in target {
        if pairs.iter().any(|&(_, w)| w == goal) {
            continue;
        }
        let closest = current
            .iter()
            .copied()
            .min_by_key(|&v| (i32::from(goal) - i32::from(v)).abs())
            .unwrap_or(goal);
        pairs.push((closest, goal));
    }

    pairs
}

fn finalize(pitches: Vec<i32>) -> Vec<u8> {
    let mut pitches: Vec<u8> = pitches
        .into_iter()
        .map(|p| p.clamp(0, 127) as u8)
        .collect();
    pitches.sort_unstable();
    pitches.dedup();
    pitches
}
