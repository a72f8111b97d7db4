use serde::{Deserialize, Serialize};

// Channel event status nibbles.
pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
pub const POLY_AFTERTOUCH: u8 = 0xA0;
pub const CONTROL_CHANGE: u8 = 0xB0;
pub const PROGRAM_CHANGE: u8 = 0xC0;
pub const CHANNEL_AFTERTOUCH: u8 = 0xD0;
pub const PITCH_BEND: u8 = 0xE0;

// System events.
pub const SYSEX_START: u8 = 0xF0;
pub const SYSEX_ESCAPE: u8 = 0xF7;
pub const META: u8 = 0xFF;

// Meta types the codec treats specially.
pub const META_TRACK_NAME: u8 = 0x03;
pub const META_END_OF_TRACK: u8 = 0x2F;

/// A single track event with running status already resolved.
///
/// `meta_type` is `Some` only for status `0xFF`. SysEx payloads are kept
/// byte-for-byte in `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiEvent {
    pub delta: u32,
    pub status: u8,
    pub meta_type: Option<u8>,
    pub data: Vec<u8>,
}

impl MidiEvent {
    pub fn meta(delta: u32, meta_type: u8, data: Vec<u8>) -> Self {
        Self {
            delta,
            status: META,
            meta_type: Some(meta_type),
            data,
        }
    }

    pub fn channel_event(delta: u32, status: u8, data: Vec<u8>) -> Self {
        Self {
            delta,
            status,
            meta_type: None,
            data,
        }
    }

    pub fn is_meta(&self) -> bool {
        self.status == META
    }

    /// Upper status nibble for channel events.
    pub fn kind(&self) -> u8 {
        self.status & 0xF0
    }

    /// Lower status nibble for channel events.
    pub fn channel(&self) -> u8 {
        self.status & 0x0F
    }

    pub fn is_end_of_track(&self) -> bool {
        self.is_meta() && self.meta_type == Some(META_END_OF_TRACK)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiTrack {
    pub name: String,
    pub events: Vec<MidiEvent>,
}

impl MidiTrack {
    /// Final absolute tick of the track (sum of all deltas).
    pub fn final_tick(&self) -> u32 {
        self.events
            .iter()
            .fold(0u32, |tick, e| tick.saturating_add(e.delta))
    }

    /// Flatten to `(absolute_tick, event)` pairs in authoring order.
    pub fn to_absolute(&self) -> Vec<(u32, MidiEvent)> {
        let mut tick = 0u32;
        self.events
            .iter()
            .map(|e| {
                tick = tick.saturating_add(e.delta);
                (tick, e.clone())
            })
            .collect()
    }

    /// Rebuild a track from absolute-tick events.
    ///
    /// Events are stably sorted by tick (equal-tick authoring order is
    /// preserved) and deltas are recomputed. An end-of-track meta, if
    /// present, is kept as the final event.
    pub fn from_absolute(name: String, mut events: Vec<(u32, MidiEvent)>) -> Self {
        let end_of_track = events
            .iter()
            .position(|(_, e)| e.is_end_of_track())
            .map(|i| events.remove(i));

        events.sort_by_key(|(tick, _)| *tick);

        if let Some((eot_tick, eot)) = end_of_track {
            let last = events.last().map(|(t, _)| *t).unwrap_or(0);
            events.push((eot_tick.max(last), eot));
        }

        let mut last_tick = 0u32;
        let events = events
            .into_iter()
            .map(|(tick, mut e)| {
                e.delta = tick.saturating_sub(last_tick);
                last_tick = tick;
                e
            })
            .collect();

        Self { name, events }
    }
}

/// An in-memory Standard MIDI File.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiFile {
    /// SMF format: 0, 1, or 2.
    pub format: u16,
    /// Ticks per quarter note.
    pub division: u16,
    pub tracks: Vec<MidiTrack>,
}

impl MidiFile {
    pub fn track_count(&self) -> u16 {
        self.tracks.len() as u16
    }
}
