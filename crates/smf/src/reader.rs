//! Tolerant byte-level SMF parser.
//!
//! Running status is resolved here so every in-memory event carries an
//! explicit status byte. Unknown channel status is reported via `warn!`
//! and the parser resyncs to the next status byte; structural problems
//! (bad signatures, truncation, oversized VLQs) abort with a typed error
//! carrying the byte offset.

use tracing::warn;

use crate::error::DecodeError;
use crate::event::{
    self, MidiEvent, MidiFile, MidiTrack, META, META_TRACK_NAME, SYSEX_ESCAPE, SYSEX_START,
};
use crate::vlq::read_vlq;

/// Parse a complete SMF byte buffer.
pub fn parse(bytes: &[u8]) -> Result<MidiFile, DecodeError> {
    if bytes.len() < 14 || &bytes[0..4] != b"MThd" {
        return Err(DecodeError::MalformedHeader {
            offset: 0,
            detail: "missing MThd signature",
        });
    }

    let header_len = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if header_len != 6 {
        return Err(DecodeError::MalformedHeader {
            offset: 4,
            detail: "header length must be 6",
        });
    }

    let format = u16::from_be_bytes([bytes[8], bytes[9]]);
    let track_count = u16::from_be_bytes([bytes[10], bytes[11]]);
    let division = u16::from_be_bytes([bytes[12], bytes[13]]);

    let mut pos = 14usize;
    let mut tracks = Vec::with_capacity(track_count as usize);

    for _ in 0..track_count {
        if pos + 8 > bytes.len() || &bytes[pos..pos + 4] != b"MTrk" {
            return Err(DecodeError::MalformedHeader {
                offset: pos,
                detail: "missing MTrk signature",
            });
        }

        let track_len =
            u32::from_be_bytes([bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]])
                as usize;
        pos += 8;

        let end = pos
            .checked_add(track_len)
            .filter(|&end| end <= bytes.len())
            .ok_or(DecodeError::TruncatedTrack { offset: pos })?;

        tracks.push(parse_track(bytes, &mut pos, end)?);
        pos = end;
    }

    Ok(MidiFile {
        format,
        division,
        tracks,
    })
}

/// Number of data bytes for a channel event kind, `None` if unknown.
fn channel_data_len(kind: u8) -> Option<usize> {
    match kind {
        event::NOTE_OFF
        | event::NOTE_ON
        | event::POLY_AFTERTOUCH
        | event::CONTROL_CHANGE
        | event::PITCH_BEND => Some(2),
        event::PROGRAM_CHANGE | event::CHANNEL_AFTERTOUCH => Some(1),
        _ => None,
    }
}

fn parse_track(bytes: &[u8], pos: &mut usize, end: usize) -> Result<MidiTrack, DecodeError> {
    let window = &bytes[..end];
    let mut track = MidiTrack::default();
    let mut running_status: Option<u8> = None;
    // After a resync the cursor sits on a status byte, not a delta; the
    // recovered event keeps a zero delta.
    let mut resynced = false;

    while *pos < end {
        let delta = if resynced {
            resynced = false;
            0
        } else {
            read_vlq(window, pos)?
        };

        let status_offset = *pos;
        let lead = *window
            .get(*pos)
            .ok_or(DecodeError::TruncatedTrack { offset: *pos })?;

        let status = if lead & 0x80 != 0 {
            *pos += 1;
            // Only channel events establish running status; meta and SysEx
            // do not become it.
            if lead < 0xF0 {
                running_status = Some(lead);
            }
            lead
        } else {
            match running_status {
                Some(status) => status,
                None => {
                    warn!(offset = status_offset, "data byte with no running status, resyncing");
                    resync(window, pos);
                    resynced = true;
                    continue;
                }
            }
        };

        match status {
            META => {
                let meta_type = *window
                    .get(*pos)
                    .ok_or(DecodeError::TruncatedTrack { offset: *pos })?;
                *pos += 1;

                let len = read_vlq(window, pos)? as usize;
                let data = take(window, pos, len)?.to_vec();

                if meta_type == META_TRACK_NAME {
                    track.name = String::from_utf8_lossy(&data).into_owned();
                }

                track.events.push(MidiEvent::meta(delta, meta_type, data));
            }
            SYSEX_START | SYSEX_ESCAPE => {
                let len = read_vlq(window, pos)? as usize;
                let data = take(window, pos, len)?.to_vec();
                track.events.push(MidiEvent {
                    delta,
                    status,
                    meta_type: None,
                    data,
                });
            }
            _ => match channel_data_len(status & 0xF0) {
                Some(len) => {
                    let data = take(window, pos, len)?.to_vec();
                    track
                        .events
                        .push(MidiEvent::channel_event(delta, status, data));
                }
                None => {
                    warn!(status, offset = status_offset, "unknown event status, resyncing");
                    resync(window, pos);
                    resynced = true;
                }
            },
        }
    }

    Ok(track)
}

/// Skip forward to the next byte with the MSB set (best-effort recovery).
fn resync(window: &[u8], pos: &mut usize) {
    while *pos < window.len() && window[*pos] & 0x80 == 0 {
        *pos += 1;
    }
}

fn take<'a>(window: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8], DecodeError> {
    let next = pos
        .checked_add(len)
        .filter(|&next| next <= window.len())
        .ok_or(DecodeError::TruncatedTrack { offset: *pos })?;
    let slice = &window[*pos..next];
    *pos = next;
    Ok(slice)
}
