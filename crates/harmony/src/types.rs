use serde::{Deserialize, Serialize};

/// A timed note extracted from the event stream.
///
/// Immutable after aggregation. A note-on with velocity 0 never reaches
/// this type; the aggregator treats it as a note-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: u8,
    pub onset: u32,
    pub duration: u32,
    pub velocity: u8,
    pub channel: u8,
}

/// A detected chord: ascending deduplicated pitches with a label.
///
/// `original_pitches`/`original_name` form the transformation shadow: they
/// are set exactly once, the first time the chord is transformed, and keep
/// the detected state through any number of subsequent transforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chord {
    pub pitches: Vec<u8>,
    pub onset: u32,
    pub duration: u32,
    pub name: String,
    pub original_pitches: Option<Vec<u8>>,
    pub original_name: Option<String>,
}

impl Chord {
    pub fn is_transformed(&self) -> bool {
        self.original_pitches.is_some()
    }
}

/// Chord rewrite modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformationType {
    /// Replace with the target chord, voice-led or octave-anchored.
    Standard,
    /// Replace with an inversion of the target chord.
    Inversion,
    /// Interpolate part-way from the current voicing to the target.
    Percentage,
    /// Flip between major-family and minor-family quality.
    SwitchTonality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationOptions {
    pub mode: TransformationType,
    /// Inversion index, clamped to the target chord size.
    pub inversion: usize,
    /// Interpolation amount for `Percentage`, clamped to 0..=100.
    pub percentage: f64,
    pub preserve_root: bool,
    pub preserve_bass: bool,
    pub use_voice_leading: bool,
}

impl Default for TransformationOptions {
    fn default() -> Self {
        Self {
            mode: TransformationType::Standard,
            inversion: 0,
            percentage: 100.0,
            preserve_root: true,
            preserve_bass: true,
            use_voice_leading: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceLeadingOptions {
    /// Weight total movement more heavily when choosing a voicing.
    pub minimize_movement: bool,
    /// Reject voicings that move a perfect fifth or octave in parallel.
    pub avoid_parallels: bool,
    /// Penalize voicings whose voice count differs from the source.
    pub maintain_voice_count: bool,
    /// Semitone span a voice may move before the over-movement penalty.
    pub max_voice_movement: u8,
}

impl Default for VoiceLeadingOptions {
    fn default() -> Self {
        Self {
            minimize_movement: true,
            avoid_parallels: false,
            maintain_voice_count: true,
            max_voice_movement: 7,
        }
    }
}

/// One voice's motion between two voicings, for reporting.
///
/// `original` is 0 for a voice that exists only in the new voicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceMovement {
    pub original: u8,
    pub new: u8,
    /// Signed semitone delta.
    pub delta: i32,
    /// Whether the move stayed within the configured movement span.
    pub optimal: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMode {
    Major,
    Minor,
}

impl std::fmt::Display for KeyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyMode::Major => write!(f, "major"),
            KeyMode::Minor => write!(f, "minor"),
        }
    }
}

/// A key candidate: spelled root, mode, scale content, and the default
/// triad quality on each scale degree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySignature {
    /// Root spelling: "C", "Eb", "F#", ...
    pub root: String,
    pub mode: KeyMode,
    /// The seven scale pitch classes, tonic first.
    pub scale: [u8; 7],
    /// Default triad quality per scale degree (1..=7).
    pub diatonic: [String; 7],
}

impl KeySignature {
    pub fn tonic_pc(&self) -> u8 {
        self.scale[0]
    }

    /// Display name: "C" for C major, "Am" for A minor.
    pub fn name(&self) -> String {
        match self.mode {
            KeyMode::Major => self.root.clone(),
            KeyMode::Minor => format!("{}m", self.root),
        }
    }
}

/// A recognized progression occurrence in the labelled chord list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionMatch {
    /// Display name, e.g. "ii-V-I in C".
    pub name: String,
    pub confidence: f64,
    pub chord_indices: Vec<usize>,
}
