//! Voice-leading search: place target pitch classes in octaves so each
//! voice moves as little as possible from the prior voicing.

use crate::types::{VoiceLeadingOptions, VoiceMovement};

/// Chooses octave placements for target pitch classes against a current
/// voicing.
///
/// The search is an exhaustive cross-product of octave assignments over a
/// window one octave beyond the current voicing's extremes. Candidate
/// counts stay small (at most five pitch classes over at most a ten-octave
/// window), so no pruning is needed.
#[derive(Debug, Clone, Default)]
pub struct VoiceLeader {
    options: VoiceLeadingOptions,
}

impl VoiceLeader {
    pub fn new(options: VoiceLeadingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &VoiceLeadingOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: VoiceLeadingOptions) {
        self.options = options;
    }

    /// Pick the voicing of `target_pitches`' classes that minimizes the
    /// movement cost from `current`.
    ///
    /// Voicings tied on cost are separated by how close the whole target
    /// sits to the current voicing. If every candidate is rejected by the
    /// parallel filter the first enumerated one is returned; with nothing
    /// to enumerate the classes are placed in octave 5.
    pub fn find_optimal_voicing(&self, target_pitches: &[u8], current: &[u8]) -> Vec<u8> {
        let classes: Vec<u8> = target_pitches.iter().map(|&p| p % 12).collect();
        if classes.is_empty() {
            return Vec::new();
        }
        if current.is_empty() {
            return octave_five(&classes);
        }

        let lowest = i32::from(*current.iter().min().expect("non-empty voicing"));
        let highest = i32::from(*current.iter().max().expect("non-empty voicing"));
        let min_octave = (lowest / 12 - 1).max(0);
        let max_octave = (highest / 12 + 1).min(10);

        let mut candidates: Vec<Vec<u8>> = Vec::new();
        let mut assignment = vec![0u8; classes.len()];
        enumerate_voicings(
            &classes,
            min_octave,
            max_octave,
            0,
            &mut assignment,
            &mut candidates,
        );

        let mut best: Option<(i64, i64, &Vec<u8>)> = None;
        for candidate in &candidates {
            if self.options.avoid_parallels && has_parallel_motion(current, candidate) {
                continue;
            }

            let cost = self.movement_cost(current, candidate);
            let anchor = anchor_distance(current, candidate);
            if best
                .as_ref()
                .map(|(c, a, _)| (cost, anchor) < (*c, *a))
                .unwrap_or(true)
            {
                best = Some((cost, anchor, candidate));
            }
        }

        match best {
            Some((_, _, voicing)) => voicing.clone(),
            None => candidates
                .into_iter()
                .next()
                .unwrap_or_else(|| octave_five(&classes)),
        }
    }

    /// Movement cost of replacing `from` with `to`: each source voice pays
    /// its distance to the nearest target pitch, distances beyond the
    /// configured span pay tenfold, a voice-count mismatch adds a flat
    /// 1000, and minimize-movement doubles the total.
    pub fn movement_cost(&self, from: &[u8], to: &[u8]) -> i64 {
        let mut cost = 0i64;

        if self.options.maintain_voice_count && from.len() != to.len() {
            cost += 1000;
        }

        let span = i64::from(self.options.max_voice_movement);
        for &voice in from {
            let distance = to
                .iter()
                .map(|&w| (i64::from(w) - i64::from(voice)).abs())
                .min()
                .unwrap_or(0);

            if distance > span {
                cost += (distance - span) * 10;
            }
            cost += distance;
        }

        if self.options.minimize_movement {
            cost *= 2;
        }
        cost
    }

    /// Per-voice movement report; target pitches not claimed by any source
    /// voice appear with the 0 "new voice" sentinel.
    pub fn analyze_movement(&self, from: &[u8], to: &[u8]) -> Vec<VoiceMovement> {
        let span = i32::from(self.options.max_voice_movement);
        let mut movements: Vec<VoiceMovement> = Vec::new();

        for &voice in from {
            let closest = to
                .iter()
                .copied()
                .min_by_key(|&w| (i32::from(w) - i32::from(voice)).abs())
                .unwrap_or(voice);
            let delta = i32::from(closest) - i32::from(voice);
            movements.push(VoiceMovement {
                original: voice,
                new: closest,
                delta,
                optimal: delta.abs() <= span,
            });
        }

        for &pitch in to {
            if !movements.iter().any(|m| m.new == pitch) {
                movements.push(VoiceMovement {
                    original: 0,
                    new: pitch,
                    delta: 0,
                    optimal: true,
                });
            }
        }

        movements
    }
}

fn anchor_distance(from: &[u8], to: &[u8]) -> i64 {
    to.iter()
        .map(|&pitch| {
            from.iter()
                .map(|&voice| (i64::from(pitch) - i64::from(voice)).abs())
                .min()
                .unwrap_or(0)
        })
        .sum()
}

fn octave_five(classes: &[u8]) -> Vec<u8> {
    let mut voicing: Vec<u8> = classes.iter().map(|&pc| pc + 60).collect();
    voicing.sort_unstable();
    voicing.dedup();
    voicing
}

fn enumerate_voicings(
    classes: &[u8],
    min_octave: i32,
    max_octave: i32,
    index: usize,
    assignment: &mut Vec<u8>,
    out: &mut Vec<Vec<u8>>,
) {
    if index == classes.len() {
        let mut voicing = assignment.clone();
        voicing.sort_unstable();
        out.push(voicing);
        return;
    }

    for octave in min_octave..=max_octave {
        let pitch = i32::from(classes[index]) + octave * 12;
        if pitch <= 127 {
            assignment[index] = pitch as u8;
            enumerate_voicings(classes, min_octave, max_octave, index + 1, assignment, out);
        }
    }
}

/// Whether any pair of voices holds a perfect fifth or octave while both
/// move a nonzero amount in the same direction.
pub fn has_parallel_motion(from: &[u8], to: &[u8]) -> bool {
    if from.len() < 2 || to.len() < 2 {
        return false;
    }

    for i in 0..from.len() {
        for j in i + 1..from.len() {
            let interval = (i32::from(from[i]) - i32::from(from[j])).abs() % 12;
            if interval != 7 && interval != 0 {
                continue;
            }

            let ni = if i < to.len() { i } else { 0 };
            let nj = if j < to.len() { j } else { to.len() - 1 };
            let new_interval = (i32::from(to[ni]) - i32::from(to[nj])).abs() % 12;
            if new_interval != interval {
                continue;
            }

            let delta_i = i32::from(to[ni]) - i32::from(from[i]);
            let delta_j = i32::from(to[nj]) - i32::from(from[j]);
            if delta_i != 0 && delta_j != 0 && delta_i.signum() == delta_j.signum() {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::chord_notes_from_name;

    #[test]
    fn minimal_motion_c_to_a_minor() {
        let leader = VoiceLeader::default();
        let target = chord_notes_from_name("Am", 4);
        let voicing = leader.find_optimal_voicing(&target, &[60, 64, 67]);
        assert_eq!(voicing, vec![60, 64, 69]);
    }

    #[test]
    fn tie_break_keeps_target_near_current() {
        // Both [57, 60, 65] and [60, 65, 69] cost 3 against C major; the
        // anchor tie-break picks the one whose pitches all sit closest.
        let leader = VoiceLeader::default();
        let target = chord_notes_from_name("F", 4);
        let voicing = leader.find_optimal_voicing(&target, &[60, 64, 67]);
        assert_eq!(voicing, vec![60, 65, 69]);
    }

    #[test]
    fn returned_voicing_minimizes_documented_cost() {
        let leader = VoiceLeader::default();
        let current = [58, 62, 65, 69];

        for target_name in ["C", "Dm", "G7", "Fmaj7", "Am"] {
            let target = chord_notes_from_name(target_name, 4);
            let chosen = leader.find_optimal_voicing(&target, &current);
            let chosen_cost = leader.movement_cost(&current, &chosen);

            // Re-enumerate the full window and confirm nothing beats it.
            let classes: Vec<u8> = target.iter().map(|p| p % 12).collect();
            let mut candidates = Vec::new();
            let mut assignment = vec![0u8; classes.len()];
            enumerate_voicings(&classes, 3, 6, 0, &mut assignment, &mut candidates);

            for candidate in candidates {
                assert!(
                    leader.movement_cost(&current, &candidate) >= chosen_cost,
                    "{target_name}: {candidate:?} beats {chosen:?}"
                );
            }
        }
    }

    #[test]
    fn parallel_fifths_detected() {
        // C-G fifth moving up a whole step in lockstep.
        assert!(has_parallel_motion(&[60, 67], &[62, 69]));
        // Contrary motion is fine.
        assert!(!has_parallel_motion(&[60, 67], &[59, 72]));
        // Oblique motion (one voice static) is fine.
        assert!(!has_parallel_motion(&[60, 67], &[60, 69]));
        // Parallel octaves are caught too.
        assert!(has_parallel_motion(&[48, 60], &[50, 62]));
    }

    #[test]
    fn avoid_parallels_filters_candidates() {
        let leader = VoiceLeader::new(VoiceLeadingOptions {
            avoid_parallels: true,
            ..VoiceLeadingOptions::default()
        });

        let current = [60, 64, 67, 71];
        let target = chord_notes_from_name("Cm7", 4);
        let voicing = leader.find_optimal_voicing(&target, &current);
        assert!(!has_parallel_motion(&current, &voicing));
    }

    #[test]
    fn empty_current_places_octave_five() {
        let leader = VoiceLeader::default();
        let voicing = leader.find_optimal_voicing(&[0, 4, 7], &[]);
        assert_eq!(voicing, vec![60, 64, 67]);
    }

    #[test]
    fn movement_analysis_reports_new_voices() {
        let leader = VoiceLeader::default();
        let movements = leader.analyze_movement(&[60, 64, 67], &[60, 63, 67, 70]);

        assert_eq!(movements.len(), 4);
        assert_eq!(movements[1].original, 64);
        assert_eq!(movements[1].new, 63);
        assert_eq!(movements[1].delta, -1);
        assert!(movements[1].optimal);

        let added = movements.last().unwrap();
        assert_eq!(added.original, 0);
        assert_eq!(added.new, 70);
        assert_eq!(added.delta, 0);
    }

    #[test]
    fn voice_count_mismatch_is_penalized() {
        let leader = VoiceLeader::default();
        let same = leader.movement_cost(&[60, 64, 67], &[60, 64, 67]);
        let fewer = leader.movement_cost(&[60, 64, 67], &[60, 64]);
        assert!(fewer >= same + 2000); // 1000 doubled by minimize_movement
    }
}
