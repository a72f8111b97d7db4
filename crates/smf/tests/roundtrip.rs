//! Codec round-trip coverage: parse → serialize → parse must yield an
//! identical event stream modulo running status and VLQ canonicalization.

use smf::event::{MidiEvent, MidiTrack, META_END_OF_TRACK};
use smf::{parse, write, MidiFile};

fn header(format: u16, tracks: u16, division: u16) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"MThd");
    bytes.extend_from_slice(&6u32.to_be_bytes());
    bytes.extend_from_slice(&format.to_be_bytes());
    bytes.extend_from_slice(&tracks.to_be_bytes());
    bytes.extend_from_slice(&division.to_be_bytes());
    bytes
}

fn chunk(body: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"MTrk");
    bytes.extend_from_slice(&(body.len() as u32).to_be_bytes());
    bytes.extend_from_slice(body);
    bytes
}

#[test]
fn running_status_and_padded_vlq_normalize_on_round_trip() {
    let mut body = Vec::new();
    // Padded (non-canonical) VLQ delta of 0, explicit note on.
    body.extend_from_slice(&[0x80, 0x00, 0x90, 60, 100]);
    // Running status note ons.
    body.extend_from_slice(&[0x00, 64, 100]);
    body.extend_from_slice(&[0x00, 67, 100]);
    // Note offs as running-status velocity-0 note ons.
    body.extend_from_slice(&[0x83, 0x60, 60, 0]);
    body.extend_from_slice(&[0x00, 64, 0]);
    body.extend_from_slice(&[0x00, 67, 0]);
    body.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);

    let mut bytes = header(0, 1, 480);
    bytes.extend_from_slice(&chunk(&body));

    let first = parse(&bytes).unwrap();
    assert_eq!(first.tracks[0].events.len(), 7);
    assert!(first.tracks[0].events[..6].iter().all(|e| e.status == 0x90));

    // The second generation is byte-stable: all statuses explicit, all
    // VLQs canonical.
    let emitted = write(&first);
    let second = parse(&emitted).unwrap();
    assert_eq!(second, first);
    assert_eq!(write(&second), emitted);
}

#[test]
fn division_and_track_names_survive() {
    let mut lead = Vec::new();
    lead.extend_from_slice(&[0x00, 0xFF, 0x03, 0x04]);
    lead.extend_from_slice(b"Lead");
    lead.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);

    let mut bass = Vec::new();
    bass.extend_from_slice(&[0x00, 0xFF, 0x03, 0x04]);
    bass.extend_from_slice(b"Bass");
    bass.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);

    let mut bytes = header(1, 2, 960);
    bytes.extend_from_slice(&chunk(&lead));
    bytes.extend_from_slice(&chunk(&bass));

    let file = parse(&bytes).unwrap();
    assert_eq!(file.division, 960);
    assert_eq!(file.tracks[0].name, "Lead");
    assert_eq!(file.tracks[1].name, "Bass");

    let reparsed = parse(&write(&file)).unwrap();
    assert_eq!(reparsed.division, 960);
    assert_eq!(reparsed.tracks[0].name, "Lead");
    assert_eq!(reparsed.tracks[1].name, "Bass");
}

#[test]
fn sysex_in_third_track_is_emitted_verbatim() {
    let empty = [0x00, 0xFF, 0x2F, 0x00];

    let mut third = Vec::new();
    third.extend_from_slice(&[0x00, 0xF7, 0x05]);
    third.extend_from_slice(&[0x01, 0x02, 0x03, 0x04, 0x05]);
    third.extend_from_slice(&empty);

    let mut bytes = header(1, 3, 480);
    bytes.extend_from_slice(&chunk(&empty));
    bytes.extend_from_slice(&chunk(&empty));
    bytes.extend_from_slice(&chunk(&third));

    let file = parse(&bytes).unwrap();
    let sysex = &file.tracks[2].events[0];
    assert_eq!(sysex.status, 0xF7);
    assert_eq!(sysex.data, vec![0x01, 0x02, 0x03, 0x04, 0x05]);

    // Emit and confirm byte equality of the second generation.
    let emitted = write(&file);
    let reparsed = parse(&emitted).unwrap();
    assert_eq!(reparsed, file);
    assert_eq!(write(&reparsed), emitted);
}

#[test]
fn programmatic_file_round_trips() {
    let file = MidiFile {
        format: 1,
        division: 480,
        tracks: vec![MidiTrack {
            name: "chords".into(),
            events: vec![
                MidiEvent::meta(0, 0x03, b"chords".to_vec()),
                MidiEvent::channel_event(0, 0x90, vec![60, 100]),
                MidiEvent::channel_event(0, 0x90, vec![64, 100]),
                MidiEvent::channel_event(480, 0x80, vec![60, 64]),
                MidiEvent::channel_event(0, 0x80, vec![64, 64]),
                MidiEvent::channel_event(0, 0xC0, vec![5]),
                MidiEvent::channel_event(0, 0xE0, vec![0x00, 0x40]),
                MidiEvent::meta(0, META_END_OF_TRACK, vec![]),
            ],
        }],
    };

    assert_eq!(parse(&write(&file)).unwrap(), file);
}
