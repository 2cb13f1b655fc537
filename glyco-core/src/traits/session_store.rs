use crate::errors::StateError;
use crate::models::{BoostAdjustmentState, UserDeviceProfile};
use crate::session::SessionHash;

/// Persisted per-session state: two JSON-shaped records keyed by the session
/// hash, never by the raw session identifier.
pub trait ISessionStore: Send + Sync {
    fn load_profile(&self, session: &SessionHash) -> Result<Option<UserDeviceProfile>, StateError>;

    fn save_profile(&self, profile: &UserDeviceProfile) -> Result<(), StateError>;

    fn load_boosts(&self, session: &SessionHash)
        -> Result<Option<BoostAdjustmentState>, StateError>;

    fn save_boosts(&self, state: &BoostAdjustmentState) -> Result<(), StateError>;
}
