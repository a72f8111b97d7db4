//! The single-owner document context and its host-facing API.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use harmony::{
    Chord, KeySignature, Note, ProgressionAnalyzer, ProgressionMatch, TransformationOptions,
    TransformationType, VoiceLeader, VoiceLeadingOptions,
};
use serde::{Deserialize, Serialize};
use smf::MidiFile;
use tracing::{debug, info};

use crate::cache::{ContentHash, DetectionCache};
use crate::error::{DocumentError, Result};
use crate::journal::{Action, ActionJournal};
use crate::rewrite;

/// Outcome of a batch transform: which indices changed, which were skipped
/// as invalid, and which produced no change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformReport {
    pub transformed: Vec<usize>,
    pub skipped: Vec<usize>,
    pub unchanged: Vec<usize>,
}

/// An in-memory MIDI document with detected chords, an undo journal, and a
/// content-keyed detection cache that lives as long as the document
/// context.
///
/// Owns all of its state exclusively; chord lists handed to callers are
/// deep snapshots. All operations are synchronous, and a failed load
/// leaves the previous document intact.
pub struct Document {
    midi: Option<MidiFile>,
    path: Option<PathBuf>,
    notes: Vec<Note>,
    chords: Vec<Chord>,
    time_tolerance: u32,
    voice_leader: VoiceLeader,
    progressions: ProgressionAnalyzer,
    journal: ActionJournal,
    cache: DetectionCache,
    content_hash: Option<ContentHash>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            midi: None,
            path: None,
            notes: Vec::new(),
            chords: Vec::new(),
            time_tolerance: harmony::DEFAULT_TIME_TOLERANCE,
            voice_leader: VoiceLeader::default(),
            progressions: ProgressionAnalyzer::new(),
            journal: ActionJournal::new(),
            cache: DetectionCache::new(),
            content_hash: None,
        }
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an SMF from disk, detect its chords, and reset the journal.
    ///
    /// The detection cache is consulted by content hash first; on a hit,
    /// aggregation and segmentation are skipped entirely.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| DocumentError::IoUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        let midi = smf::parse(&bytes)?;
        let hash = ContentHash::from_data(&bytes);

        match self.cache.get(&hash) {
            Some(chords) => {
                info!(hash = %hash, chords = chords.len(), "chord detection cache hit");
                self.notes = Vec::new();
                self.chords = chords;
            }
            None => {
                let notes = harmony::extract_notes(&midi);
                let chords = harmony::detect_chords(&notes, self.time_tolerance);
                info!(
                    hash = %hash,
                    notes = notes.len(),
                    chords = chords.len(),
                    "detected chords"
                );
                self.cache.put(hash.clone(), &chords);
                self.notes = notes;
                self.chords = chords;
            }
        }

        self.midi = Some(midi);
        self.path = Some(path.to_path_buf());
        self.content_hash = Some(hash);
        self.journal.clear();
        Ok(())
    }

    /// Serialize the document, with every transformed chord applied to the
    /// event stream.
    ///
    /// The in-memory event list stays untouched, so saving is repeatable.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let midi = self.midi.as_ref().ok_or(DocumentError::EmptyInput)?;

        let mut out = midi.clone();
        rewrite::apply_chord_edits(&mut out, &self.chords, self.time_tolerance);

        fs::write(path, smf::write(&out)).map_err(|source| DocumentError::IoUnavailable {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Drop all document state and this file's cache entry.
    pub fn unload(&mut self) {
        if let Some(hash) = self.content_hash.take() {
            self.cache.invalidate(&hash);
        }
        self.midi = None;
        self.path = None;
        self.notes.clear();
        self.chords.clear();
        self.journal.clear();
    }

    pub fn is_loaded(&self) -> bool {
        self.midi.is_some()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Deep snapshot of the labelled chord list.
    pub fn chords(&self) -> Vec<Chord> {
        self.chords.clone()
    }

    pub fn chord_count(&self) -> usize {
        self.chords.len()
    }

    pub fn chord(&self, index: usize) -> Result<Chord> {
        self.chords
            .get(index)
            .cloned()
            .ok_or(DocumentError::OutOfRange {
                index,
                len: self.chords.len(),
            })
    }

    /// Replace a chord wholesale. Undo/redo restores snapshots through
    /// this.
    pub fn update_chord(&mut self, index: usize, chord: Chord) -> Result<()> {
        let len = self.chords.len();
        match self.chords.get_mut(index) {
            Some(slot) => {
                *slot = chord;
                Ok(())
            }
            None => Err(DocumentError::OutOfRange { index, len }),
        }
    }

    /// Transform the selected chords toward their paired target names.
    ///
    /// Invalid indices and slots without a target are skipped and
    /// reported, never aborting the batch; the journal records one action
    /// covering exactly the chords that changed.
    pub fn transform(
        &mut self,
        indices: &[usize],
        targets: &[String],
        options: &[TransformationOptions],
    ) -> Result<TransformReport> {
        if self.chords.is_empty() {
            return Err(DocumentError::EmptyInput);
        }

        let mut report = TransformReport::default();
        let mut affected = Vec::new();
        let mut before = Vec::new();
        let mut after = Vec::new();

        for (slot, &index) in indices.iter().enumerate() {
            let (Some(target), Some(opts)) = (targets.get(slot), options.get(slot)) else {
                report.skipped.push(index);
                continue;
            };

            if index >= self.chords.len() {
                debug!(index, "transform index out of range, skipping");
                report.skipped.push(index);
                continue;
            }

            match self.apply_target(index, target, opts) {
                Some((prev, next)) => {
                    affected.push(index);
                    before.push(prev);
                    after.push(next);
                    report.transformed.push(index);
                }
                None => report.unchanged.push(index),
            }
        }

        if !affected.is_empty() {
            let description = format!("Transform {} chord(s)", affected.len());
            self.journal
                .record(Action::new(affected, before, after, description));
        }

        Ok(report)
    }

    /// Flip one chord across the major/minor divide.
    ///
    /// Returns `false` when the chord's quality has no tonality mapping.
    pub fn switch_tonality(&mut self, index: usize) -> Result<bool> {
        if self.chords.is_empty() {
            return Err(DocumentError::EmptyInput);
        }

        let chord = self.chord(index)?;
        let Some(target) = harmony::switched_tonality(&chord.name) else {
            return Ok(false);
        };

        let options = TransformationOptions {
            mode: TransformationType::SwitchTonality,
            ..TransformationOptions::default()
        };

        if let Some((prev, next)) = self.apply_target(index, &target, &options) {
            let description = format!("Switch tonality of chord {index}");
            self.journal
                .record(Action::new(vec![index], vec![prev], vec![next], description));
        }
        Ok(true)
    }

    /// Mutate one chord toward a target name, returning (before, after)
    /// snapshots, or `None` if nothing changed.
    fn apply_target(
        &mut self,
        index: usize,
        target: &str,
        options: &TransformationOptions,
    ) -> Option<(Chord, Chord)> {
        let chord = self.chords.get_mut(index)?;
        let pitches = harmony::transform_chord(&self.voice_leader, &chord.pitches, target, options);

        if pitches == chord.pitches && chord.name == target {
            return None;
        }

        let previous = chord.clone();
        if chord.original_pitches.is_none() {
            chord.original_pitches = Some(chord.pitches.clone());
            chord.original_name = Some(chord.name.clone());
        }
        chord.pitches = pitches;
        chord.name = target.to_string();

        Some((previous, chord.clone()))
    }

    /// Undo the most recent action. `false` when the journal is exhausted.
    pub fn undo(&mut self) -> bool {
        let Some(action) = self.journal.undo() else {
            return false;
        };
        debug!(description = %action.description, "undo");

        for (slot, &index) in action.indices.iter().enumerate() {
            if let Some(snapshot) = action.before.get(slot) {
                if index < self.chords.len() {
                    self.chords[index] = snapshot.clone();
                }
            }
        }
        true
    }

    /// Re-apply the most recently undone action.
    pub fn redo(&mut self) -> bool {
        let Some(action) = self.journal.redo() else {
            return false;
        };
        debug!(description = %action.description, "redo");

        for (slot, &index) in action.indices.iter().enumerate() {
            if let Some(snapshot) = action.after.get(slot) {
                if index < self.chords.len() {
                    self.chords[index] = snapshot.clone();
                }
            }
        }
        true
    }

    pub fn can_undo(&self) -> bool {
        self.journal.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.journal.can_redo()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.journal.undo_description()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.journal.redo_description()
    }

    /// Best key for the current chord list, absent when no key clears the
    /// confidence bar.
    pub fn detect_key(&self) -> Option<KeySignature> {
        harmony::detect_key(&self.chords)
    }

    /// Recognized progressions in the current chord list, best first.
    pub fn analyze_progressions(&self) -> Vec<ProgressionMatch> {
        self.progressions.detect(&self.chords)
    }

    pub fn progressions_mut(&mut self) -> &mut ProgressionAnalyzer {
        &mut self.progressions
    }

    pub fn time_tolerance(&self) -> u32 {
        self.time_tolerance
    }

    /// Set the segmentation tolerance used by subsequent loads.
    pub fn set_time_tolerance(&mut self, ticks: u32) {
        self.time_tolerance = ticks;
    }

    pub fn voice_leading_options(&self) -> &VoiceLeadingOptions {
        self.voice_leader.options()
    }

    pub fn set_voice_leading_options(&mut self, options: VoiceLeadingOptions) {
        self.voice_leader.set_options(options);
    }

    /// Aggregated notes from the last analyzed load (empty after a
    /// cache-hit load).
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Plain-text chord analysis: header block, then one record per chord
    /// with the transformation shadow for transformed chords.
    pub fn chord_analysis_report(&self) -> String {
        let mut out = String::new();
        out.push_str("MIDI Chord Analysis\n");
        out.push_str("===================\n");

        let file = self
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let _ = writeln!(out, "File: {file}");
        let _ = writeln!(out, "Number of chords: {}", self.chords.len());
        out.push('\n');

        out.push_str("Chord List:\n");
        out.push_str("----------\n");

        for (i, chord) in self.chords.iter().enumerate() {
            let _ = writeln!(
                out,
                "Chord {}: {} at {} ticks, duration: {} ticks",
                i + 1,
                chord.name,
                chord.onset,
                chord.duration
            );
            let _ = writeln!(out, "  Notes: {}", harmony::format_pitches(&chord.pitches));

            if let (Some(original_name), Some(original_pitches)) =
                (&chord.original_name, &chord.original_pitches)
            {
                let _ = writeln!(out, "  Original: {original_name}");
                let _ = writeln!(
                    out,
                    "  Original Notes: {}",
                    harmony::format_pitches(original_pitches)
                );
            }

            out.push('\n');
        }

        out
    }

    /// Write the chord analysis dump next to wherever the caller points.
    pub fn save_chord_analysis(&self, path: impl AsRef<Path>) -> Result<()> {
        if self.midi.is_none() {
            return Err(DocumentError::EmptyInput);
        }

        let path = path.as_ref();
        fs::write(path, self.chord_analysis_report()).map_err(|source| {
            DocumentError::IoUnavailable {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}
