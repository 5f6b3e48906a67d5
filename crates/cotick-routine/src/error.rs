//! Routine definition errors.
//!
//! These are raised while parsing or registering routines. Failures while
//! a routine runs are logged and turned into a `KO` completion instead.

use cotick_command::CommandError;
use cotick_types::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoutineError {
    /// A `=` line while a `while` block is still open.
    #[error("unexpected start of new routine at line {line}")]
    UnexpectedRoutineStart { line: usize },

    #[error("unexpected instruction '{instruction}' at line {line} outside of a routine")]
    OutsideRoutine { instruction: String, line: usize },

    /// `source` holds the more specific cause, when there is one.
    #[error("could not parse instruction '{instruction}' at line {line}")]
    InvalidInstruction {
        instruction: String,
        line: usize,
        #[source]
        source: Option<Box<RoutineError>>,
    },

    /// A command line that does not tokenize.
    #[error("invalid command line")]
    CommandLine(#[from] CommandError),

    /// Placeholders are 1-based.
    #[error("invalid placeholder '{0}'")]
    InvalidPlaceholder(String),

    #[error("invalid wait duration '{0}'")]
    InvalidDuration(String),

    #[error("routine '{0}' is already registered")]
    Duplicate(String),
}

impl ErrorCode for RoutineError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnexpectedRoutineStart { .. } => "ROUTINE_UNEXPECTED_START",
            Self::OutsideRoutine { .. } => "ROUTINE_OUTSIDE_ROUTINE",
            Self::InvalidInstruction { .. } => "ROUTINE_INVALID_INSTRUCTION",
            Self::CommandLine(_) => "ROUTINE_COMMAND_LINE",
            Self::InvalidPlaceholder(_) => "ROUTINE_INVALID_PLACEHOLDER",
            Self::InvalidDuration(_) => "ROUTINE_INVALID_DURATION",
            Self::Duplicate(_) => "ROUTINE_DUPLICATE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cotick_types::assert_error_codes;

    #[test]
    fn codes_are_prefixed() {
        assert_error_codes(
            &[
                RoutineError::UnexpectedRoutineStart { line: 3 },
                RoutineError::OutsideRoutine {
                    instruction: "-cmd".into(),
                    line: 1,
                },
                RoutineError::InvalidInstruction {
                    instruction: "x".into(),
                    line: 2,
                    source: None,
                },
                RoutineError::CommandLine(CommandError::parse("-cmd \"", "unterminated quote")),
                RoutineError::InvalidPlaceholder("$0".into()),
                RoutineError::InvalidDuration("soon".into()),
                RoutineError::Duplicate("mine".into()),
            ],
            "ROUTINE_",
        );
    }

    #[test]
    fn invalid_instruction_keeps_its_cause() {
        use std::error::Error as _;

        let err = RoutineError::InvalidInstruction {
            instruction: "-cmd $0".into(),
            line: 4,
            source: Some(Box::new(RoutineError::InvalidPlaceholder("$0".into()))),
        };
        let cause = err.source().map(ToString::to_string);
        assert_eq!(cause.as_deref(), Some("invalid placeholder '$0'"));
    }

    #[test]
    fn messages_name_the_line() {
        assert_eq!(
            RoutineError::UnexpectedRoutineStart { line: 3 }.to_string(),
            "unexpected start of new routine at line 3"
        );
        assert_eq!(
            RoutineError::OutsideRoutine {
                instruction: "-cmd test".into(),
                line: 1
            }
            .to_string(),
            "unexpected instruction '-cmd test' at line 1 outside of a routine"
        );
    }
}
