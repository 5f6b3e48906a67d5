//! Host setup and persistence errors.

use std::path::PathBuf;

use cotick_command::CommandError;
use cotick_process::SaveError;
use cotick_routine::RoutineError;
use cotick_types::ErrorCode;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to read routines '{path}': {source}")]
    ReadRoutines {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid routines in '{path}': {source}")]
    Routines {
        path: PathBuf,
        #[source]
        source: RoutineError,
    },

    #[error("failed to read save file '{path}': {source}")]
    ReadSave {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write save file '{path}': {source}")]
    WriteSave {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Save(#[from] SaveError),

    /// Registration of a host command failed.
    #[error(transparent)]
    Command(#[from] CommandError),
}

impl ErrorCode for HostError {
    fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "HOST_CONFIG",
            Self::ReadRoutines { .. } => "HOST_READ_ROUTINES",
            Self::Routines { .. } => "HOST_INVALID_ROUTINES",
            Self::ReadSave { .. } => "HOST_READ_SAVE",
            Self::WriteSave { .. } => "HOST_WRITE_SAVE",
            Self::Save(_) => "HOST_SAVE_STATE",
            Self::Command(_) => "HOST_COMMAND",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::WriteSave { .. })
    }
}
