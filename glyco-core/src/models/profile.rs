use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::session::SessionHash;

/// Whether a device entry came from auto-detection or the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideSource {
    AutoDetected,
    /// An explicit user correction; always wins over later auto-detection.
    User,
}

/// Devices registered to a session, detected from uploaded documents or set
/// explicitly by the user. Persists for the lifetime of the session's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDeviceProfile {
    pub session_hash: SessionHash,
    pub pump: Option<String>,
    pub cgm: Option<String>,
    /// Per-device detection confidence, keyed by canonical device name.
    pub detection_confidence: HashMap<String, f64>,
    pub override_source: OverrideSource,
    pub updated_at: DateTime<Utc>,
}

impl UserDeviceProfile {
    pub fn new(session_hash: SessionHash) -> Self {
        Self {
            session_hash,
            pump: None,
            cgm: None,
            detection_confidence: HashMap::new(),
            override_source: OverrideSource::AutoDetected,
            updated_at: Utc::now(),
        }
    }

    /// True when at least one device is registered.
    pub fn has_devices(&self) -> bool {
        self.pump.is_some() || self.cgm.is_some()
    }
}
