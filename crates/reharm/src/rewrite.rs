//! Save-time application of chord edits to the event stream.
//!
//! Transformed chords never touch the live event list while editing; at
//! serialization time each transformed chord's member note events are
//! remapped to the new pitches and any new voices are inserted as fresh
//! note pairs at the chord onset.

use std::collections::{HashMap, HashSet};

use harmony::Chord;
use smf::{event, MidiEvent, MidiFile, MidiTrack};
use tracing::debug;

/// Pitch surgery derived from one transformed chord's shadow.
struct ChordEdit {
    onset: u32,
    duration: u32,
    /// Original member pitch → nearest new pitch.
    remap: HashMap<u8, u8>,
    /// New pitches no original voice was mapped to.
    added: Vec<u8>,
}

/// Rewrite every track so transformed chords sound with their new pitches.
pub fn apply_chord_edits(midi: &mut MidiFile, chords: &[Chord], tolerance: u32) {
    let edits: Vec<ChordEdit> = chords.iter().filter_map(chord_edit).collect();
    if edits.is_empty() {
        return;
    }

    debug!(edits = edits.len(), "applying chord edits to event stream");
    for track in &mut midi.tracks {
        rewrite_track(track, &edits, tolerance);
    }
}

fn chord_edit(chord: &Chord) -> Option<ChordEdit> {
    let original = chord.original_pitches.as_ref()?;

    let mut remap = HashMap::new();
    for &voice in original {
        let closest = chord
            .pitches
            .iter()
            .copied()
            .min_by_key(|&pitch| (i32::from(pitch) - i32::from(voice)).abs());
        if let Some(pitch) = closest {
            remap.insert(voice, pitch);
        }
    }

    let claimed: HashSet<u8> = remap.values().copied().collect();
    let added = chord
        .pitches
        .iter()
        .copied()
        .filter(|pitch| !claimed.contains(pitch))
        .collect();

    Some(ChordEdit {
        onset: chord.onset,
        duration: chord.duration,
        remap,
        added,
    })
}

fn rewrite_track(track: &mut MidiTrack, edits: &[ChordEdit], tolerance: u32) {
    let mut events = track.to_absolute();
    // Currently-sounding remapped notes: original pitch → replacement, so
    // the matching note-off keeps the pair consistent.
    let mut open: HashMap<u8, u8> = HashMap::new();
    // First member note-on per edit in this track, for voicing inserts.
    let mut member_voice: Vec<Option<(u8, u8)>> = vec![None; edits.len()];
    let mut changed = false;

    for (tick, midi_event) in events.iter_mut() {
        if midi_event.is_meta() || midi_event.data.len() < 2 {
            continue;
        }

        let pitch = midi_event.data[0];
        let kind = midi_event.kind();

        if kind == event::NOTE_ON && midi_event.data[1] > 0 {
            let member = edits.iter().enumerate().find(|(_, edit)| {
                tick.abs_diff(edit.onset) <= tolerance && edit.remap.contains_key(&pitch)
            });

            if let Some((index, edit)) = member {
                if member_voice[index].is_none() {
                    member_voice[index] = Some((midi_event.channel(), midi_event.data[1]));
                }

                let replacement = edit.remap[&pitch];
                if replacement != pitch {
                    midi_event.data[0] = replacement;
                    open.insert(pitch, replacement);
                    changed = true;
                }
            }
        } else if kind == event::NOTE_OFF || kind == event::NOTE_ON {
            if let Some(replacement) = open.remove(&pitch) {
                midi_event.data[0] = replacement;
            }
        }
    }

    for (index, edit) in edits.iter().enumerate() {
        let Some((channel, velocity)) = member_voice[index] else {
            continue;
        };

        for &pitch in &edit.added {
            events.push((
                edit.onset,
                MidiEvent::channel_event(0, event::NOTE_ON | channel, vec![pitch, velocity]),
            ));
            events.push((
                edit.onset.saturating_add(edit.duration.max(1)),
                MidiEvent::channel_event(0, event::NOTE_OFF | channel, vec![pitch, 64]),
            ));
            changed = true;
        }
    }

    if changed {
        let name = std::mem::take(&mut track.name);
        *track = MidiTrack::from_absolute(name, events);
    }
}
