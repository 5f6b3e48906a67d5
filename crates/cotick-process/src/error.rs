//! Process and persistence errors.
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | `ProcessError::NotAlive` | `PROCESS_NOT_ALIVE` | no |
//! | `ProcessError::NotFound` | `PROCESS_NOT_FOUND` | no |
//! | `ProcessError::Action` | `PROCESS_ACTION_FAILED` | yes |
//! | `SaveError::Serialize` | `SAVE_SERIALIZE` | no |
//! | `SaveError::Parse` | `SAVE_PARSE` | no |

use cotick_types::{ErrorCode, ProcessId};
use thiserror::Error;

/// Errors raised by process operations and returned from callbacks.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The target process has already finished or is being torn down.
    #[error("process {0} is not alive")]
    NotAlive(ProcessId),

    /// No process with this id exists (never spawned, or already reaped).
    #[error("process {0} not found")]
    NotFound(ProcessId),

    /// A process action or completion callback reported a failure.
    #[error("{0}")]
    Action(String),
}

impl ProcessError {
    /// Creates an action failure from any message.
    pub fn action(message: impl Into<String>) -> Self {
        Self::Action(message.into())
    }
}

impl ErrorCode for ProcessError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotAlive(_) => "PROCESS_NOT_ALIVE",
            Self::NotFound(_) => "PROCESS_NOT_FOUND",
            Self::Action(_) => "PROCESS_ACTION_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Action(_))
    }
}

/// Errors from serialising or restoring saved state.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("failed to serialize saved state: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("failed to parse saved state: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ErrorCode for SaveError {
    fn code(&self) -> &'static str {
        match self {
            Self::Serialize(_) => "SAVE_SERIALIZE",
            Self::Parse(_) => "SAVE_PARSE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
