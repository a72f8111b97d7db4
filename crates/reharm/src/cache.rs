//! Content-addressed memoization of chord detection.
//!
//! Keys are BLAKE3 hashes truncated to 128 bits (32 lowercase hex chars);
//! values are deep copies of the labelled chord list taken at parse time.
//! The cache lives for the process and entries are dropped when their
//! document is unloaded.

use std::collections::HashMap;
use std::fmt;

use harmony::Chord;
use serde::{Deserialize, Serialize};

/// A 128-bit content hash in lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    pub fn from_data(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        Self(hex::encode(&hash.as_bytes()[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct DetectionCache {
    entries: HashMap<ContentHash, Vec<Chord>>,
}

impl DetectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep copy of the cached chord list, if any.
    pub fn get(&self, hash: &ContentHash) -> Option<Vec<Chord>> {
        self.entries.get(hash).cloned()
    }

    /// Store a deep copy of the chord list under `hash`.
    pub fn put(&mut self, hash: ContentHash, chords: &[Chord]) {
        self.entries.insert(hash, chords.to_vec());
    }

    pub fn invalidate(&mut self, hash: &ContentHash) {
        self.entries.remove(hash);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chords() -> Vec<Chord> {
        vec![Chord {
            pitches: vec![60, 64, 67],
            onset: 0,
            duration: 480,
            name: "C".into(),
            original_pitches: None,
            original_name: None,
        }]
    }

    #[test]
    fn hash_is_32_lowercase_hex_chars() {
        let hash = ContentHash::from_data(b"MThd");
        assert_eq!(hash.as_str().len(), 32);
        assert!(hash
            .as_str()
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn hash_is_deterministic_and_content_sensitive() {
        assert_eq!(ContentHash::from_data(b"a"), ContentHash::from_data(b"a"));
        assert_ne!(ContentHash::from_data(b"a"), ContentHash::from_data(b"b"));
    }

    #[test]
    fn cache_round_trip_is_a_deep_copy() {
        let mut cache = DetectionCache::new();
        let hash = ContentHash::from_data(b"file bytes");
        let chords = sample_chords();

        cache.put(hash.clone(), &chords);
        let mut fetched = cache.get(&hash).expect("hit");
        assert_eq!(fetched, chords);

        // Mutating the fetched copy must not leak into the cache.
        fetched[0].name = "mutated".into();
        assert_eq!(cache.get(&hash).unwrap()[0].name, "C");
    }

    #[test]
    fn invalidate_removes_the_entry() {
        let mut cache = DetectionCache::new();
        let hash = ContentHash::from_data(b"file bytes");
        cache.put(hash.clone(), &sample_chords());

        cache.invalidate(&hash);
        assert!(cache.get(&hash).is_none());
        assert!(cache.is_empty());
    }
}
