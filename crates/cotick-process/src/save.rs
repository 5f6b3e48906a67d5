//! Key/value state contributed by save hooks.
//!
//! The scheduler does not interpret saved values. Hooks registered with
//! [`Scheduler::add_on_save`](crate::Scheduler::add_on_save) write into
//! named sections, and the host stores the TOML rendering wherever it
//! wants:
//!
//! ```toml
//! [store]
//! greeting = "hello"
//! ```

use crate::SaveError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sectioned string key/value map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveState {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl SaveState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `section.key`, replacing any previous value.
    pub fn set(
        &mut self,
        section: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.sections
            .entry(section.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str)
    }

    #[must_use]
    pub fn section(&self, section: &str) -> Option<&BTreeMap<String, String>> {
        self.sections.get(section)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.values().all(BTreeMap::is_empty)
    }

    /// Renders the state as TOML tables.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Serialize`] if TOML rendering fails.
    pub fn to_toml(&self) -> Result<String, SaveError> {
        Ok(toml::to_string(self)?)
    }

    /// Parses state previously produced by [`SaveState::to_toml`].
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Parse`] for malformed input.
    pub fn from_toml(text: &str) -> Result<Self, SaveError> {
        Ok(toml::from_str(text)?)
    }
}
