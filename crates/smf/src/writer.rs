//! SMF serialization.
//!
//! Emits an explicit status byte for every event (running status is never
//! re-collapsed) and canonical VLQs, so the output re-parses to the exact
//! event stream that was written.

use crate::event::{MidiFile, SYSEX_ESCAPE, SYSEX_START};
use crate::vlq::write_vlq;

/// Serialize a `MidiFile` to SMF bytes.
pub fn write(file: &MidiFile) -> Vec<u8> {
    let mut buf = Vec::new();

    buf.extend_from_slice(b"MThd");
    buf.extend_from_slice(&6u32.to_be_bytes());
    buf.extend_from_slice(&file.format.to_be_bytes());
    buf.extend_from_slice(&file.track_count().to_be_bytes());
    buf.extend_from_slice(&file.division.to_be_bytes());

    for track in &file.tracks {
        buf.extend_from_slice(b"MTrk");

        // Reserve the 4-byte length slot, backfilled once the track body
        // is streamed.
        let length_slot = buf.len();
        buf.extend_from_slice(&[0u8; 4]);
        let body_start = buf.len();

        for event in &track.events {
            write_vlq(&mut buf, event.delta);
            buf.push(event.status);

            if let Some(meta_type) = event.meta_type {
                buf.push(meta_type);
                write_vlq(&mut buf, event.data.len() as u32);
            } else if event.status == SYSEX_START || event.status == SYSEX_ESCAPE {
                write_vlq(&mut buf, event.data.len() as u32);
            }

            buf.extend_from_slice(&event.data);
        }

        let body_len = (buf.len() - body_start) as u32;
        buf[length_slot..length_slot + 4].copy_from_slice(&body_len.to_be_bytes());
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{MidiEvent, MidiTrack, META_END_OF_TRACK};
    use crate::reader::parse;

    fn one_note_file() -> MidiFile {
        MidiFile {
            format: 0,
            division: 96,
            tracks: vec![MidiTrack {
                name: String::new(),
                events: vec![
                    MidiEvent::channel_event(0, 0x90, vec![60, 100]),
                    MidiEvent::channel_event(96, 0x80, vec![60, 0]),
                    MidiEvent::meta(0, META_END_OF_TRACK, vec![]),
                ],
            }],
        }
    }

    #[test]
    fn header_fields_are_big_endian() {
        let bytes = write(&one_note_file());
        assert_eq!(&bytes[0..4], b"MThd");
        assert_eq!(u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 6);
        assert_eq!(u16::from_be_bytes([bytes[8], bytes[9]]), 0);
        assert_eq!(u16::from_be_bytes([bytes[10], bytes[11]]), 1);
        assert_eq!(u16::from_be_bytes([bytes[12], bytes[13]]), 96);
    }

    #[test]
    fn track_length_is_backfilled() {
        let bytes = write(&one_note_file());
        let len = u32::from_be_bytes([bytes[18], bytes[19], bytes[20], bytes[21]]) as usize;
        assert_eq!(14 + 8 + len, bytes.len());
    }

    #[test]
    fn write_parse_round_trip() {
        let file = one_note_file();
        let reparsed = parse(&write(&file)).unwrap();
        assert_eq!(reparsed, file);
    }
}
