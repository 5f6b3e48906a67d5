//! Layered configuration.
//!
//! ```text
//! Priority (highest to lowest):
//!
//! ┌──────────────────────────────────────────┐
//! │  1. CLI flags (applied by the binary)    │
//! ├──────────────────────────────────────────┤
//! │  2. Environment Variables (COTICK_*)     │
//! ├──────────────────────────────────────────┤
//! │  3. Project Config (.cotick/config.toml) │
//! ├──────────────────────────────────────────┤
//! │  4. Global Config (~/.cotick/config.toml)│
//! ├──────────────────────────────────────────┤
//! │  5. Default Values                       │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Config Field | Type |
//! |----------|--------------|------|
//! | `COTICK_DEBUG` | `debug` | bool |
//! | `COTICK_SMART` | `scheduler.smart` | bool |
//! | `COTICK_MAX_TICKS` | `scheduler.max_ticks` | u64 |
//! | `COTICK_ROUTINES` | `paths.routines` | PathBuf |
//! | `COTICK_SAVE_FILE` | `paths.save_file` | PathBuf |
//!
//! # Example Configuration
//!
//! ```toml
//! debug = false
//!
//! [scheduler]
//! smart = true
//! tick_interval_ms = 0
//! max_ticks = 1000
//! idle_exit = true
//!
//! [paths]
//! routines = "routines.txt"
//! save_file = "state.toml"
//!
//! [logging]
//! file = "cotick.log"
//! file_level = "debug"
//! ```

mod error;
mod loader;
mod types;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use types::{CotickConfig, LoggingConfig, PathsConfig, SchedulerConfig};

/// Default global config directory.
pub fn default_config_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join(".cotick")
}

/// Default global config file path.
pub fn default_config_path() -> std::path::PathBuf {
    default_config_dir().join("config.toml")
}

/// Project config directory name.
pub const PROJECT_CONFIG_DIR: &str = ".cotick";

/// Project config file name.
pub const PROJECT_CONFIG_FILE: &str = "config.toml";
