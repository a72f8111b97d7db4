//! Progression detection: slide quality templates over the labelled chord
//! list and score each window.

use std::cmp::Ordering;

use crate::templates::parse_chord_name;
use crate::types::{Chord, ProgressionMatch};

/// A known progression: bare qualities per position, a display name, the
/// keys it commonly appears in, and which position carries the tonic.
#[derive(Debug, Clone)]
pub struct ProgressionPattern {
    pub name: String,
    pub qualities: Vec<String>,
    pub common_keys: Vec<String>,
    pub tonic_index: usize,
}

impl ProgressionPattern {
    fn new(name: &str, qualities: &[&str], common_keys: &[&str], tonic_index: usize) -> Self {
        Self {
            name: name.to_string(),
            qualities: qualities.iter().map(|q| q.to_string()).collect(),
            common_keys: common_keys.iter().map(|k| k.to_string()).collect(),
            tonic_index,
        }
    }
}

/// Minimum scaled confidence for a window to be reported.
const MATCH_THRESHOLD: f64 = 0.6;

pub struct ProgressionAnalyzer {
    patterns: Vec<ProgressionPattern>,
}

impl Default for ProgressionAnalyzer {
    fn default() -> Self {
        Self {
            patterns: built_in_patterns(),
        }
    }
}

impl ProgressionAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pattern(&mut self, pattern: ProgressionPattern) {
        self.patterns.push(pattern);
    }

    pub fn patterns(&self) -> &[ProgressionPattern] {
        &self.patterns
    }

    /// Find every pattern occurrence with confidence at or above the
    /// threshold, best first.
    pub fn detect(&self, chords: &[Chord]) -> Vec<ProgressionMatch> {
        if chords.len() < 2 {
            return Vec::new();
        }

        let labels: Vec<(String, String)> = chords
            .iter()
            .map(|chord| parse_chord_name(&chord.name))
            .collect();

        let mut matches = Vec::new();

        for pattern in &self.patterns {
            let len = pattern.qualities.len();
            if len > chords.len() || len == 0 {
                continue;
            }

            for start in 0..=chords.len() - len {
                let Some(score) = window_score(&labels[start..start + len], &pattern.qualities)
                else {
                    continue;
                };

                let mut confidence = score / len as f64;

                // Common-key comparison is case-sensitive on the window's
                // starting root.
                let start_root = &labels[start].0;
                let key_match = pattern
                    .common_keys
                    .iter()
                    .any(|key| key == start_root || *key == format!("{start_root}m"));
                confidence *= if key_match { 1.2 } else { 0.8 };

                if confidence >= MATCH_THRESHOLD {
                    let tonic_root = &labels[start + pattern.tonic_index.min(len - 1)].0;
                    matches.push(ProgressionMatch {
                        name: format!("{} in {}", pattern.name, tonic_root),
                        confidence,
                        chord_indices: (start..start + len).collect(),
                    });
                }
            }
        }

        matches.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(Ordering::Equal)
        });
        matches
    }
}

/// Accumulated score for one window, `None` on any hard mismatch.
///
/// Exact quality matches score 1.0 (a bare-major pattern slot also accepts
/// maj7, 6, and 9); qualities agreeing only on their first letter score
/// 0.5.
fn window_score(window: &[(String, String)], qualities: &[String]) -> Option<f64> {
    let mut score = 0.0;

    for ((_, chord_quality), pattern_quality) in window.iter().zip(qualities) {
        if exact_quality_match(chord_quality, pattern_quality) {
            score += 1.0;
        } else if first_letter_match(chord_quality, pattern_quality) {
            score += 0.5;
        } else {
            return None;
        }
    }

    Some(score)
}

fn exact_quality_match(chord: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        matches!(chord, "" | "maj7" | "6" | "9")
    } else {
        chord == pattern
    }
}

fn first_letter_match(chord: &str, pattern: &str) -> bool {
    match (chord.chars().next(), pattern.chars().next()) {
        (Some(c), Some(p)) => c == p,
        _ => false,
    }
}

fn built_in_patterns() -> Vec<ProgressionPattern> {
    vec![
        ProgressionPattern::new(
            "ii-V-I",
            &["m7", "7", "maj7"],
            &["C", "F", "Bb", "Eb", "G", "D", "A"],
            2,
        ),
        ProgressionPattern::new("I-IV-V", &["", "", ""], &["C", "G", "D", "A", "E", "F"], 0),
        ProgressionPattern::new(
            "I-V-vi-IV",
            &["", "", "m", ""],
            &["C", "G", "D", "A", "F"],
            0,
        ),
        ProgressionPattern::new(
            "I-vi-IV-V (50s)",
            &["", "m", "", ""],
            &["C", "G", "D", "A", "F"],
            0,
        ),
        ProgressionPattern::new(
            "vi-IV-I-V",
            &["m", "", "", ""],
            &["C", "G", "D", "A", "F"],
            2,
        ),
        ProgressionPattern::new(
            "Canon Progression",
            &["", "", "m", "m", "", "", "", ""],
            &["D", "G", "C"],
            0,
        ),
        ProgressionPattern::new(
            "Andalusian Cadence",
            &["m", "", "", ""],
            &["Am", "Em", "Dm"],
            0,
        ),
        ProgressionPattern::new("Mixolydian Vamp", &["", "", ""], &["G", "D", "A", "E"], 0),
        ProgressionPattern::new("Minor Blues", &["m", "m", "m"], &["Am", "Em", "Dm", "Gm"], 0),
        ProgressionPattern::new(
            "Major-Minor Change",
            &["", "7", "", "m"],
            &["C", "G", "D", "F"],
            0,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(name: &str) -> Chord {
        Chord {
            pitches: vec![60, 64, 67],
            onset: 0,
            duration: 480,
            name: name.to_string(),
            original_pitches: None,
            original_name: None,
        }
    }

    #[test]
    fn two_five_one_in_c() {
        let analyzer = ProgressionAnalyzer::new();
        let chords = vec![chord("Dm7"), chord("G7"), chord("Cmaj7")];

        let matches = analyzer.detect(&chords);
        let best = matches.first().expect("a match");
        assert_eq!(best.name, "ii-V-I in C");
        assert!(best.confidence >= 0.72, "confidence {}", best.confidence);
        assert_eq!(best.chord_indices, vec![0, 1, 2]);
    }

    #[test]
    fn uncommon_key_scales_confidence_down() {
        let analyzer = ProgressionAnalyzer::new();
        // Full quality match but C# is not a listed ii-V-I key.
        let chords = vec![chord("C#m7"), chord("F#7"), chord("Bmaj7")];

        let matches = analyzer.detect(&chords);
        let best = matches
            .iter()
            .find(|m| m.name.starts_with("ii-V-I"))
            .expect("a match");
        assert_eq!(best.name, "ii-V-I in B");
        assert!((best.confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn first_letter_match_scores_half() {
        let analyzer = ProgressionAnalyzer::new();
        // Minor blues pattern against extended minor qualities.
        let chords = vec![chord("Am7"), chord("Dm7"), chord("Em7")];

        let matches = analyzer.detect(&chords);
        let blues = matches
            .iter()
            .find(|m| m.name.starts_with("Minor Blues"))
            .expect("a match");
        // Three half-score positions, boosted by the Am common key.
        assert!((blues.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn mismatch_aborts_window() {
        let analyzer = ProgressionAnalyzer::new();
        let chords = vec![chord("Dm7"), chord("Gsus4"), chord("Cmaj7")];
        assert!(analyzer.detect(&chords).is_empty());
    }

    #[test]
    fn matches_sorted_by_confidence() {
        let analyzer = ProgressionAnalyzer::new();
        let chords = vec![chord("C"), chord("F"), chord("G"), chord("Am")];

        let matches = analyzer.detect(&chords);
        assert!(!matches.is_empty());
        for pair in matches.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn custom_patterns_participate() {
        let mut analyzer = ProgressionAnalyzer::new();
        analyzer.add_pattern(ProgressionPattern::new(
            "Backdoor",
            &["m7", "7", "maj7"],
            &["F"],
            2,
        ));

        let chords = vec![chord("Fm7"), chord("Bb7"), chord("Ebmaj7")];
        let matches = analyzer.detect(&chords);
        assert!(matches.iter().any(|m| m.name == "Backdoor in Eb"));
    }
}
