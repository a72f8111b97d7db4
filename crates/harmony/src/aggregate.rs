//! Note aggregation: pair note-on/note-off events into timed notes.

use std::collections::HashMap;

use smf::{event, MidiFile};

use crate::types::Note;

/// Extract every closed note from the file, sorted by onset then pitch.
///
/// Each track is walked with its own absolute-tick counter. A note-on with
/// velocity 0 closes the pending slot like a note-off. Notes still open at
/// the end of a track are force-closed at the track's final tick.
pub fn extract_notes(midi: &MidiFile) -> Vec<Note> {
    let mut notes = Vec::new();

    for track in &midi.tracks {
        let mut now = 0u32;
        // pitch → (onset, velocity, channel)
        let mut pending: HashMap<u8, (u32, u8, u8)> = HashMap::new();

        for midi_event in &track.events {
            now = now.saturating_add(midi_event.delta);

            if midi_event.is_meta() || midi_event.data.len() < 2 {
                continue;
            }

            let pitch = midi_event.data[0];
            match midi_event.kind() {
                event::NOTE_ON => {
                    let velocity = midi_event.data[1];
                    if velocity > 0 {
                        pending.insert(pitch, (now, velocity, midi_event.channel()));
                    } else if let Some((onset, velocity, channel)) = pending.remove(&pitch) {
                        notes.push(close_note(pitch, onset, now, velocity, channel));
                    }
                }
                event::NOTE_OFF => {
                    if let Some((onset, velocity, channel)) = pending.remove(&pitch) {
                        notes.push(close_note(pitch, onset, now, velocity, channel));
                    }
                }
                _ => {}
            }
        }

        for (pitch, (onset, velocity, channel)) in pending.drain() {
            notes.push(close_note(pitch, onset, now, velocity, channel));
        }
    }

    notes.sort_by(|a, b| a.onset.cmp(&b.onset).then(a.pitch.cmp(&b.pitch)));
    notes
}

fn close_note(pitch: u8, onset: u32, now: u32, velocity: u8, channel: u8) -> Note {
    Note {
        pitch,
        onset,
        duration: now.saturating_sub(onset),
        velocity,
        channel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smf::{MidiEvent, MidiTrack};

    fn file_with_events(events: Vec<MidiEvent>) -> MidiFile {
        MidiFile {
            format: 0,
            division: 480,
            tracks: vec![MidiTrack {
                name: String::new(),
                events,
            }],
        }
    }

    #[test]
    fn pairs_note_on_with_note_off() {
        let midi = file_with_events(vec![
            MidiEvent::channel_event(0, 0x90, vec![60, 100]),
            MidiEvent::channel_event(480, 0x80, vec![60, 64]),
        ]);

        let notes = extract_notes(&midi);
        assert_eq!(notes.len(), 1);
        assert_eq!(
            notes[0],
            Note {
                pitch: 60,
                onset: 0,
                duration: 480,
                velocity: 100,
                channel: 0,
            }
        );
    }

    #[test]
    fn velocity_zero_note_on_closes() {
        let midi = file_with_events(vec![
            MidiEvent::channel_event(0, 0x91, vec![72, 90]),
            MidiEvent::channel_event(240, 0x91, vec![72, 0]),
        ]);

        let notes = extract_notes(&midi);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].duration, 240);
        assert_eq!(notes[0].channel, 1);
        assert_eq!(notes[0].velocity, 90);
    }

    #[test]
    fn unmatched_note_off_is_ignored() {
        let midi = file_with_events(vec![MidiEvent::channel_event(0, 0x80, vec![60, 0])]);
        assert!(extract_notes(&midi).is_empty());
    }

    #[test]
    fn open_notes_close_at_track_end() {
        let midi = file_with_events(vec![
            MidiEvent::channel_event(0, 0x90, vec![60, 100]),
            MidiEvent::channel_event(100, 0x90, vec![64, 100]),
            MidiEvent::channel_event(380, 0x80, vec![64, 0]),
        ]);

        let notes = extract_notes(&midi);
        assert_eq!(notes.len(), 2);
        // The unclosed C ends at the final tick of the track.
        assert_eq!(notes[0].pitch, 60);
        assert_eq!(notes[0].duration, 480);
    }

    #[test]
    fn output_ordered_by_onset_then_pitch() {
        let midi = file_with_events(vec![
            MidiEvent::channel_event(0, 0x90, vec![67, 80]),
            MidiEvent::channel_event(0, 0x90, vec![60, 80]),
            MidiEvent::channel_event(0, 0x90, vec![64, 80]),
            MidiEvent::channel_event(480, 0x80, vec![67, 0]),
            MidiEvent::channel_event(0, 0x80, vec![60, 0]),
            MidiEvent::channel_event(0, 0x80, vec![64, 0]),
        ]);

        let pitches: Vec<u8> = extract_notes(&midi).iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![60, 64, 67]);
    }

    #[test]
    fn pairing_count_matches_closed_pairs() {
        // Two tracks, three closed pairs plus one force-closed note.
        let track_a = MidiTrack {
            name: String::new(),
            events: vec![
                MidiEvent::channel_event(0, 0x90, vec![60, 100]),
                MidiEvent::channel_event(10, 0x90, vec![62, 100]),
                MidiEvent::channel_event(90, 0x80, vec![60, 0]),
                MidiEvent::channel_event(0, 0x80, vec![62, 0]),
            ],
        };
        let track_b = MidiTrack {
            name: String::new(),
            events: vec![
                MidiEvent::channel_event(0, 0x90, vec![48, 70]),
                MidiEvent::channel_event(50, 0x80, vec![48, 0]),
                MidiEvent::channel_event(0, 0x90, vec![50, 70]),
            ],
        };
        let midi = MidiFile {
            format: 1,
            division: 480,
            tracks: vec![track_a, track_b],
        };

        assert_eq!(extract_notes(&midi).len(), 4);
    }
}
