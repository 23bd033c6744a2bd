use log::{info, warn};

use super::store::{ConsentFile, ConsentPreferences, ConsentStore};

/// Consent categories that can be queried individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentCategory {
    Necessary,
    Analytics,
    Marketing,
    Preferences,
}

/// In-memory view of the consent store.
///
/// Without a store (no data directory) choices last for the session only.
pub struct ConsentManager {
    store: Option<ConsentStore>,
    state: ConsentFile,
}

impl ConsentManager {
    /// Load recorded consent; an unreadable store counts as "not asked yet".
    pub fn open(store: Option<ConsentStore>) -> Self {
        let state = match store.as_ref().map(ConsentStore::load) {
            Some(Ok(state)) => state,
            Some(Err(e)) => {
                warn!("ignoring consent store: {e}");
                ConsentFile::default()
            }
            None => ConsentFile::default(),
        };
        Self { store, state }
    }

    pub fn has_consent(&self) -> bool {
        self.state.consent.is_some()
    }

    pub fn preferences(&self) -> Option<ConsentPreferences> {
        self.state.consent
    }

    /// Record a choice. Withdrawing `preferences` forgets stored personalisation.
    pub fn save_consent(&mut self, mut prefs: ConsentPreferences) {
        prefs.necessary = true;
        if !prefs.preferences {
            self.state.preferences.clear();
        }
        self.state.consent = Some(prefs);
        self.persist();
        info!(
            "consent recorded: analytics={} marketing={} preferences={}",
            prefs.analytics, prefs.marketing, prefs.preferences
        );
    }

    pub fn is_enabled(&self, category: ConsentCategory) -> bool {
        let Some(c) = self.state.consent else {
            return false;
        };
        match category {
            ConsentCategory::Necessary => c.necessary,
            ConsentCategory::Analytics => c.analytics,
            ConsentCategory::Marketing => c.marketing,
            ConsentCategory::Preferences => c.preferences,
        }
    }

    /// Emit a usage event to the `analytics` log target, if allowed.
    pub fn track_event(&self, name: &str, value: Option<&str>) -> bool {
        if !self.is_enabled(ConsentCategory::Analytics) {
            return false;
        }
        info!(target: "analytics", "event={name} value={}", value.unwrap_or("-"));
        true
    }

    pub fn user_preference(&self, key: &str) -> Option<&str> {
        if !self.is_enabled(ConsentCategory::Preferences) {
            return None;
        }
        self.state.preferences.get(key).map(String::as_str)
    }

    /// Store a personalisation value. Returns false (and stores nothing)
    /// without preference consent.
    pub fn save_user_preference(&mut self, key: &str, value: &str) -> bool {
        if !self.is_enabled(ConsentCategory::Preferences) {
            return false;
        }
        self.state
            .preferences
            .insert(key.to_string(), value.to_string());
        self.persist();
        true
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.save(&self.state) {
            warn!("could not write {}: {e}", store.path().display());
        }
    }
}
