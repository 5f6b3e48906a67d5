//! Process identifiers and terminal outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a process in the scheduler arena.
///
/// Ids are handed out in creation order and never reused, so a stale id
/// simply stops resolving once its process has been reaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessId(u64);

impl ProcessId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProcessId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Terminal outcome recorded when a process stops being alive.
///
/// | Variant | Reached through |
/// |---------|-----------------|
/// | `Ok` | `done`, or a `once` process firing |
/// | `Killed` | `kill`, `kill_all`, or a cascading kill from an ancestor |
/// | `Failed` | `fail` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProcessResult {
    #[default]
    Ok,
    Killed,
    Failed,
}

impl ProcessResult {
    /// Returns `true` for a normal completion.
    #[must_use]
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Returns `true` when the process was killed.
    #[must_use]
    pub fn is_killed(self) -> bool {
        matches!(self, Self::Killed)
    }
}

impl fmt::Display for ProcessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Killed => write!(f, "KILLED"),
            Self::Failed => write!(f, "KO"),
        }
    }
}
