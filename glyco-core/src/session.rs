//! Session identity and collection naming.
//!
//! Raw session identifiers cross the system boundary exactly once: they are
//! hashed into an opaque [`SessionHash`] and never stored or logged raw.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One-way, deterministic digest of a raw session identifier.
///
/// All per-session state (device profile, boost adjustments, experiment
/// assignment, audit rows) is keyed by this digest. No component downstream
/// of the boundary ever sees the raw identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionHash(String);

impl SessionHash {
    /// Hash a raw session identifier. The only way to mint a new hash.
    pub fn from_raw(raw: &str) -> Self {
        Self(blake3::hash(raw.as_bytes()).to_hex().to_string())
    }

    /// Rehydrate an already-hashed value loaded from persisted state.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a vector-store collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(String);

impl CollectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CollectionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashing_is_deterministic() {
        assert_eq!(SessionHash::from_raw("abc"), SessionHash::from_raw("abc"));
        assert_ne!(SessionHash::from_raw("abc"), SessionHash::from_raw("abd"));
    }

    #[test]
    fn raw_identifier_does_not_leak() {
        let h = SessionHash::from_raw("patient-session-42");
        assert!(!h.as_str().contains("patient"));
        assert_eq!(h.as_str().len(), 64);
    }
}
