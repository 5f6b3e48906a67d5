//! Positional placeholders (`$1`, `$2`, ...).

use std::fmt;

use crate::RoutineError;

/// An argument that is either written literally or taken from the
/// routine's arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Template {
    Literal(String),
    /// 1-based index into the routine arguments.
    Placeholder(usize),
}

impl Template {
    /// `$` followed by digits is a placeholder; anything else, including
    /// `$name`, is literal.
    ///
    /// # Errors
    ///
    /// [`RoutineError::InvalidPlaceholder`] for `$0` or an index that
    /// does not fit in `usize`.
    pub fn parse(text: &str) -> Result<Self, RoutineError> {
        match text.strip_prefix('$') {
            Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                match digits.parse::<usize>() {
                    Ok(index) if index > 0 => Ok(Self::Placeholder(index)),
                    _ => Err(RoutineError::InvalidPlaceholder(text.to_string())),
                }
            }
            _ => Ok(Self::Literal(text.to_string())),
        }
    }

    /// Highest argument index this template needs, 0 for literals.
    #[must_use]
    pub fn arg_index(&self) -> usize {
        match self {
            Self::Literal(_) => 0,
            Self::Placeholder(index) => *index,
        }
    }

    /// The literal text, or the referenced argument if present.
    #[must_use]
    pub fn resolve<'a>(&'a self, args: &'a [String]) -> Option<&'a str> {
        match self {
            Self::Literal(text) => Some(text.as_str()),
            Self::Placeholder(index) => args.get(index - 1).map(String::as_str),
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Placeholder(index) => write!(f, "${index}"),
        }
    }
}
