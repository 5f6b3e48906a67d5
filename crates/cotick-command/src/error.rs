//! Command registration and invocation errors.
//!
//! Invocation errors are reported to the dispatcher's logger and returned
//! to the caller; no process is created. Registration errors are
//! configuration mistakes and should abort start-up.

use cotick_process::ProcessError;
use cotick_types::{ErrorCode, Trigger};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    /// Blank input line.
    #[error("empty command line")]
    Empty,

    /// Unbalanced quotes or a dangling escape.
    #[error("failed to parse '{line}': {reason}")]
    Parse { line: String, reason: String },

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("permission denied for '{command}': requires {required}, got {trigger}")]
    PermissionDenied {
        command: String,
        required: Trigger,
        trigger: Trigger,
    },

    #[error("wrong number of arguments for '{command}': got {given}, {expected}")]
    WrongArity {
        command: String,
        given: usize,
        expected: String,
    },

    #[error("expected subcommand for '{0}'")]
    MissingSubcommand(String),

    #[error("invalid subcommand '{subcommand}' for '{command}'")]
    UnknownSubcommand { command: String, subcommand: String },

    /// `-h` was given; the command's help is printed instead of running it.
    #[error("help requested for '{command}'")]
    Help { command: String, lines: Vec<String> },

    /// Registration reused a name.
    #[error("command '{0}' is already registered")]
    Duplicate(String),

    /// The spawner process was gone when the command started.
    #[error("failed to spawn command process: {0}")]
    Spawn(#[from] ProcessError),
}

impl CommandError {
    pub fn parse(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            line: line.into(),
            reason: reason.into(),
        }
    }
}

impl ErrorCode for CommandError {
    fn code(&self) -> &'static str {
        match self {
            Self::Empty => "COMMAND_EMPTY",
            Self::Parse { .. } => "COMMAND_PARSE",
            Self::UnknownCommand(_) => "COMMAND_UNKNOWN",
            Self::PermissionDenied { .. } => "COMMAND_PERMISSION_DENIED",
            Self::WrongArity { .. } => "COMMAND_WRONG_ARITY",
            Self::MissingSubcommand(_) => "COMMAND_MISSING_SUBCOMMAND",
            Self::UnknownSubcommand { .. } => "COMMAND_UNKNOWN_SUBCOMMAND",
            Self::Help { .. } => "COMMAND_HELP",
            Self::Duplicate(_) => "COMMAND_DUPLICATE",
            Self::Spawn(_) => "COMMAND_SPAWN_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        // A corrected invocation can succeed; permissions, registry
        // conflicts and dead spawners cannot be fixed by retyping.
        !matches!(
            self,
            Self::PermissionDenied { .. } | Self::Duplicate(_) | Self::Spawn(_)
        )
    }
}
