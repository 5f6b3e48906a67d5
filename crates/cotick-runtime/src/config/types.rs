//! Configuration types.
//!
//! All types implement [`Default`] for the fallback values.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Merged configuration.
///
/// ```
/// use cotick_runtime::config::CotickConfig;
///
/// let config = CotickConfig::default();
/// assert!(!config.debug);
/// assert!(config.scheduler.smart);
/// assert_eq!(config.scheduler.max_ticks, 1000);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CotickConfig {
    pub debug: bool,
    pub scheduler: SchedulerConfig,
    pub paths: PathsConfig,
    pub logging: LoggingConfig,
}

impl CotickConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// # Errors
    ///
    /// Returns error if deserialization fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Merges another config into this one.
    ///
    /// Values from `other` override values in `self` only if they
    /// differ from the default.
    pub fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.debug != default.debug {
            self.debug = other.debug;
        }

        self.scheduler.merge(&other.scheduler);
        self.paths.merge(&other.paths);
        self.logging.merge(&other.logging);
    }
}

/// Tick loop settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Spread same-period processes over distinct ticks.
    pub smart: bool,

    /// Sleep between ticks once input is exhausted (0 = none).
    pub tick_interval_ms: u64,

    /// Upper bound on ticks run after input is exhausted.
    pub max_ticks: u64,

    /// Stop as soon as no process is alive.
    pub idle_exit: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            smart: true,
            tick_interval_ms: 0,
            max_ticks: 1000,
            idle_exit: true,
        }
    }
}

impl SchedulerConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.smart != default.smart {
            self.smart = other.smart;
        }
        if other.tick_interval_ms != default.tick_interval_ms {
            self.tick_interval_ms = other.tick_interval_ms;
        }
        if other.max_ticks != default.max_ticks {
            self.max_ticks = other.max_ticks;
        }
        if other.idle_exit != default.idle_exit {
            self.idle_exit = other.idle_exit;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    /// Routine document loaded at startup.
    pub routines: Option<PathBuf>,

    /// Key/value state restored at startup and written by `save`.
    pub save_file: Option<PathBuf>,
}

impl PathsConfig {
    fn merge(&mut self, other: &Self) {
        if other.routines.is_some() {
            self.routines.clone_from(&other.routines);
        }
        if other.save_file.is_some() {
            self.save_file.clone_from(&other.save_file);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Additional log file, written without ANSI colors.
    pub file: Option<PathBuf>,

    /// Filter directive for the log file.
    pub file_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            file_level: "debug".into(),
        }
    }
}

impl LoggingConfig {
    fn merge(&mut self, other: &Self) {
        let default = Self::default();

        if other.file.is_some() {
            self.file.clone_from(&other.file);
        }
        if other.file_level != default.file_level {
            self.file_level.clone_from(&other.file_level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = CotickConfig::from_toml(
            r#"
[scheduler]
max_ticks = 50
"#,
        )
        .unwrap();

        assert_eq!(config.scheduler.max_ticks, 50);
        assert!(config.scheduler.smart);
        assert!(config.scheduler.idle_exit);
        assert_eq!(config.logging.file_level, "debug");
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = CotickConfig::default();
        config.paths.routines = Some(PathBuf::from("routines.txt"));
        config.scheduler.smart = false;

        let text = config.to_toml().unwrap();
        assert_eq!(CotickConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn merge_only_overrides_non_defaults() {
        let mut base = CotickConfig::default();
        base.debug = true;
        base.scheduler.max_ticks = 10;
        base.paths.save_file = Some(PathBuf::from("base.toml"));

        let mut overlay = CotickConfig::default();
        overlay.scheduler.smart = false;
        overlay.paths.routines = Some(PathBuf::from("overlay.txt"));

        base.merge(&overlay);

        assert!(base.debug);
        assert!(!base.scheduler.smart);
        assert_eq!(base.scheduler.max_ticks, 10);
        assert_eq!(base.paths.save_file, Some(PathBuf::from("base.toml")));
        assert_eq!(base.paths.routines, Some(PathBuf::from("overlay.txt")));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = CotickConfig::from_toml("colour = true\n[scheduler]\nsmart = false\n").unwrap();
        assert!(!config.scheduler.smart);
    }
}
