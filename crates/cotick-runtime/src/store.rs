//! Key/value store behind `set` and `get`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use cotick_process::SaveState;

/// Save state section holding the store.
pub(crate) const SECTION: &str = "store";

/// Shared string map. Clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct KvStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl KvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Returns the previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.borrow_mut().insert(key.into(), value.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Replaces the entries with the `store` section of `state`.
    pub fn restore(&self, state: &SaveState) {
        let restored = state.section(SECTION).cloned().unwrap_or_default();
        *self.entries.borrow_mut() = restored;
    }

    pub fn write_to(&self, state: &mut SaveState) {
        for (key, value) in self.entries.borrow().iter() {
            state.set(SECTION, key.as_str(), value.as_str());
        }
    }
}
