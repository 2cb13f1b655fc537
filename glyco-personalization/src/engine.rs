//! PersonalizationEngine: boost application and feedback learning.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tracing::{debug, warn};

use glyco_core::config::PersonalizationConfig;
use glyco_core::errors::StateError;
use glyco_core::models::{BoostAdjustmentState, OverrideSource, RetrievalResult, UserDeviceProfile};
use glyco_core::session::{CollectionId, SessionHash};
use glyco_core::traits::ISessionStore;

use crate::devices;

/// Thumbs-up / thumbs-down on an answer sourced from a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Helpful,
    NotHelpful,
}

pub struct PersonalizationEngine {
    config: PersonalizationConfig,
    store: Arc<dyn ISessionStore>,
    /// Serializes concurrent feedback for the same session; cross-session
    /// events share nothing and take different locks.
    session_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl PersonalizationEngine {
    pub fn new(config: PersonalizationConfig, store: Arc<dyn ISessionStore>) -> Self {
        Self {
            config,
            store,
            session_locks: DashMap::new(),
        }
    }

    /// Register an uploaded document: detect devices and fold them into the
    /// session's profile. An explicit user override is never overwritten by
    /// auto-detection.
    pub fn register_upload(
        &self,
        session: &SessionHash,
        document_text: &str,
    ) -> Result<UserDeviceProfile, StateError> {
        let mut profile = self
            .store
            .load_profile(session)?
            .unwrap_or_else(|| UserDeviceProfile::new(session.clone()));

        for detection in devices::detect(document_text) {
            if detection.confidence < self.config.min_detection_confidence {
                continue;
            }
            if profile.override_source == OverrideSource::User {
                debug!(device = %detection.canonical, "skipping auto-detection, user override set");
                continue;
            }
            let slot = match detection.kind {
                devices::DeviceKind::Pump => &mut profile.pump,
                devices::DeviceKind::Cgm => &mut profile.cgm,
            };
            let previous_confidence = slot
                .as_ref()
                .and_then(|name| profile.detection_confidence.get(name))
                .copied()
                .unwrap_or(0.0);
            if detection.confidence >= previous_confidence {
                *slot = Some(detection.canonical.clone());
                profile
                    .detection_confidence
                    .insert(detection.canonical.clone(), detection.confidence);
            }
        }
        profile.updated_at = chrono::Utc::now();
        self.store.save_profile(&profile)?;
        Ok(profile)
    }

    /// Explicit user correction. Always wins; marks the profile as
    /// user-owned so later uploads do not reshuffle it.
    pub fn correct_devices(
        &self,
        session: &SessionHash,
        pump: Option<String>,
        cgm: Option<String>,
    ) -> Result<UserDeviceProfile, StateError> {
        let mut profile = self
            .store
            .load_profile(session)?
            .unwrap_or_else(|| UserDeviceProfile::new(session.clone()));
        if pump.is_some() {
            profile.pump = pump;
        }
        if cgm.is_some() {
            profile.cgm = cgm;
        }
        profile.override_source = OverrideSource::User;
        profile.updated_at = chrono::Utc::now();
        self.store.save_profile(&profile)?;
        Ok(profile)
    }

    /// The stored device profile for a session, if any. Read failures
    /// degrade to `None` with a warning.
    pub fn profile(&self, session: &SessionHash) -> Option<UserDeviceProfile> {
        match self.store.load_profile(session) {
            Ok(profile) => profile,
            Err(e) => {
                warn!(error = %e, "profile load failed");
                None
            }
        }
    }

    /// Apply per-collection boosts to results matching the session's
    /// registered devices. Identity when there is no session, no profile,
    /// or no registered devices. State-read failures degrade to identity.
    pub fn boost(
        &self,
        mut results: Vec<RetrievalResult>,
        session: Option<&SessionHash>,
    ) -> Vec<RetrievalResult> {
        let Some(session) = session else {
            return results;
        };
        let profile = match self.store.load_profile(session) {
            Ok(Some(p)) if p.has_devices() => p,
            Ok(_) => return results,
            Err(e) => {
                warn!(error = %e, "profile load failed, skipping boost");
                return results;
            }
        };
        let boosts = match self.store.load_boosts(session) {
            Ok(state) => state,
            Err(e) => {
                warn!(error = %e, "boost state load failed, skipping boost");
                None
            }
        };

        let device_keys = self.device_collection_keys(&profile);
        for result in &mut results {
            let matches_device = device_keys
                .iter()
                .any(|key| devices::collection_matches(result.collection_id.as_str(), key));
            if !matches_device {
                continue;
            }
            result.is_user_device = true;
            if let Some(state) = &boosts {
                let boost = state.boost_for(&result.collection_id);
                if boost > 0.0 {
                    result.confidence = result.confidence + boost;
                }
            }
        }
        results
    }

    /// Record feedback for a collection and return the new boost.
    ///
    /// Effective learning rate decays with feedback volume:
    /// `r = base_rate / (1 + decay_factor × n)`, so early feedback moves the
    /// boost strongly and later feedback stabilizes it.
    pub fn record_feedback(
        &self,
        session: &SessionHash,
        collection: &CollectionId,
        feedback: Feedback,
    ) -> Result<f64, StateError> {
        let lock = self
            .session_locks
            .entry(session.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut state = self
            .store
            .load_boosts(session)?
            .unwrap_or_else(|| BoostAdjustmentState::new(session.clone()));

        let n = state.count_for(collection);
        let rate = self.config.base_rate / (1.0 + self.config.decay_factor * n as f64);
        let current = state.boost_for(collection);
        let new_boost = match feedback {
            Feedback::Helpful => current + rate,
            Feedback::NotHelpful => current - rate,
        }
        .clamp(0.0, self.config.max_boost);

        state
            .source_adjustments
            .insert(collection.clone(), new_boost);
        state.feedback_count.insert(collection.clone(), n + 1);
        state.updated_at = chrono::Utc::now();
        self.store.save_boosts(&state)?;

        debug!(
            collection = %collection,
            n,
            rate,
            new_boost,
            "recorded feedback"
        );
        Ok(new_boost)
    }

    fn device_collection_keys(&self, profile: &UserDeviceProfile) -> Vec<String> {
        let registered: Vec<&str> = profile
            .pump
            .iter()
            .chain(profile.cgm.iter())
            .map(|s| s.as_str())
            .collect();
        devices::catalog()
            .iter()
            .filter(|d| registered.contains(&d.canonical))
            .map(|d| d.collection_key.to_string())
            .collect()
    }
}
