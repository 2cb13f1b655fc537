//! JSON-file session store.
//!
//! Two records per session, under a directory named by the session hash:
//! `<root>/<session_hash>/profile.json` and `<root>/<session_hash>/boosts.json`.
//! The raw session identifier never appears on disk.

use std::fs;
use std::path::{Path, PathBuf};

use glyco_core::errors::StateError;
use glyco_core::models::{BoostAdjustmentState, UserDeviceProfile};
use glyco_core::session::SessionHash;
use glyco_core::traits::ISessionStore;

pub struct JsonSessionStore {
    root: PathBuf,
}

impl JsonSessionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn session_dir(&self, session: &SessionHash) -> PathBuf {
        self.root.join(session.as_str())
    }

    fn read_record<T: serde::de::DeserializeOwned>(
        &self,
        path: &Path,
    ) -> Result<Option<T>, StateError> {
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(path).map_err(|e| StateError::ReadFailed {
            reason: format!("{}: {e}", path.display()),
        })?;
        let record = serde_json::from_str(&raw).map_err(|e| StateError::Corrupt {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(record))
    }

    fn write_record<T: serde::Serialize>(&self, path: &Path, record: &T) -> Result<(), StateError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StateError::WriteFailed {
                reason: format!("{}: {e}", parent.display()),
            })?;
        }
        let raw = serde_json::to_string_pretty(record).map_err(|e| StateError::WriteFailed {
            reason: e.to_string(),
        })?;
        // Write-then-rename so a crash never leaves a torn record.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(|e| StateError::WriteFailed {
            reason: format!("{}: {e}", tmp.display()),
        })?;
        fs::rename(&tmp, path).map_err(|e| StateError::WriteFailed {
            reason: format!("{}: {e}", path.display()),
        })?;
        Ok(())
    }
}

impl ISessionStore for JsonSessionStore {
    fn load_profile(&self, session: &SessionHash) -> Result<Option<UserDeviceProfile>, StateError> {
        self.read_record(&self.session_dir(session).join("profile.json"))
    }

    fn save_profile(&self, profile: &UserDeviceProfile) -> Result<(), StateError> {
        self.write_record(
            &self.session_dir(&profile.session_hash).join("profile.json"),
            profile,
        )
    }

    fn load_boosts(
        &self,
        session: &SessionHash,
    ) -> Result<Option<BoostAdjustmentState>, StateError> {
        self.read_record(&self.session_dir(session).join("boosts.json"))
    }

    fn save_boosts(&self, state: &BoostAdjustmentState) -> Result<(), StateError> {
        self.write_record(
            &self.session_dir(&state.session_hash).join("boosts.json"),
            state,
        )
    }
}
