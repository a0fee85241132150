//! Interface fingerprints.

use serde::{Deserialize, Serialize};
use std::fmt;
use xxhash_rust::xxh3::Xxh3;

/// XXH3-128 digest of an ordered field sequence.
///
/// The library fingerprints each cell's ordered `(pin name, direction)`
/// sequence with it. Equal fingerprints mean a remap between the two cells is
/// worth checking pin by pin; different fingerprints reject it outright.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(u128);

impl ContentHash {
    /// Hashes `fields` in order. Every field is length-prefixed so shifting
    /// bytes between neighbours changes the digest.
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut hasher = Xxh3::new();
        for field in fields {
            hasher.update(&(field.len() as u64).to_le_bytes());
            hasher.update(field);
        }
        Self(hasher.digest128())
    }

    /// The first eight hex digits, enough to tell interfaces apart in logs.
    pub fn short(&self) -> String {
        format!("{:08x}", self.0 >> 96)
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({}..)", self.short())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interface(pins: &[&str]) -> ContentHash {
        ContentHash::from_fields(pins.iter().map(|p| p.as_bytes()))
    }

    #[test]
    fn same_interface_same_fingerprint() {
        assert_eq!(interface(&["A", "in", "Y", "out"]), interface(&["A", "in", "Y", "out"]));
        assert_ne!(interface(&["A", "in", "Y", "out"]), interface(&["Y", "out", "A", "in"]));
    }

    #[test]
    fn fields_are_length_prefixed() {
        assert_ne!(interface(&["ab", "c"]), interface(&["a", "bc"]));
    }

    #[test]
    fn display_is_full_width_hex() {
        let h = interface(&["A"]);
        let text = h.to_string();
        assert_eq!(text.len(), 32);
        assert!(text.starts_with(&h.short()));
    }

    #[test]
    fn serde_roundtrip() {
        let h = interface(&["D", "in", "CK", "in", "Q", "out"]);
        let json = serde_json::to_string(&h).unwrap();
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(h, back);
    }
}
