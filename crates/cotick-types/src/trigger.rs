//! Invocation origin, used as a permission level.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a command invocation came from.
///
/// Variants are ordered from least to most trusted. A command requiring
/// trigger `T` accepts any invocation whose trigger is `>= T`.
///
/// ```text
/// Antenna  <  User  <  Cmd
/// (remote)   (typed)   (internal / routines)
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// Automated input relayed from outside the host.
    Antenna,
    /// Interactive user input.
    #[default]
    User,
    /// Programmatic invocation (routines, other commands).
    Cmd,
}

impl Trigger {
    /// Returns `true` if an invocation with this trigger may run a
    /// command that requires `required`.
    #[must_use]
    pub fn allows(self, required: Trigger) -> bool {
        self >= required
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Antenna => write!(f, "antenna"),
            Self::User => write!(f, "user"),
            Self::Cmd => write!(f, "cmd"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(Trigger::Antenna < Trigger::User);
        assert!(Trigger::User < Trigger::Cmd);
    }

    #[test]
    fn allows_same_or_higher() {
        assert!(Trigger::Cmd.allows(Trigger::Cmd));
        assert!(Trigger::Cmd.allows(Trigger::Antenna));
        assert!(Trigger::User.allows(Trigger::User));
        assert!(!Trigger::User.allows(Trigger::Cmd));
        assert!(!Trigger::Antenna.allows(Trigger::User));
    }

    #[test]
    fn display_lowercase() {
        assert_eq!(Trigger::Antenna.to_string(), "antenna");
        assert_eq!(Trigger::default().to_string(), "user");
    }
}
