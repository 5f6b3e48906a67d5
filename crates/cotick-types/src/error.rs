//! Machine-readable error codes shared by every cotick crate.
//!
//! Each library error enum implements [`ErrorCode`] so hosts can react to
//! a stable code instead of matching on display strings.
//!
//! ```
//! use cotick_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum LoadError {
//!     Missing,
//!     Busy,
//! }
//!
//! impl ErrorCode for LoadError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Missing => "LOAD_MISSING",
//!             Self::Busy => "LOAD_BUSY",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Busy)
//!     }
//! }
//!
//! assert_eq!(LoadError::Busy.code(), "LOAD_BUSY");
//! assert!(!LoadError::Missing.is_recoverable());
//! ```

/// Stable error code interface.
///
/// Codes are UPPER_SNAKE_CASE and prefixed with the owning domain
/// (`PROCESS_`, `COMMAND_`, `ROUTINE_`, ...). Once published a code does
/// not change.
///
/// An error is recoverable when the caller can fix it without changing
/// code or input files, e.g. by retrying the invocation with the right
/// number of arguments. Malformed routine documents and duplicate
/// registrations are not.
pub trait ErrorCode {
    /// Returns the machine-readable code.
    fn code(&self) -> &'static str;

    /// Returns whether a corrected retry can succeed.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code is non-empty, carries `expected_prefix`
/// and is UPPER_SNAKE_CASE.
///
/// # Panics
///
/// Panics with a descriptive message when a check fails.
///
/// ```
/// use cotick_types::{ErrorCode, assert_error_code};
///
/// struct Timeout;
///
/// impl ErrorCode for Timeout {
///     fn code(&self) -> &'static str { "NET_TIMEOUT" }
///     fn is_recoverable(&self) -> bool { true }
/// }
///
/// assert_error_code(&Timeout, "NET_");
/// ```
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{code}' must start with prefix '{expected_prefix}'"
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{code}' must be UPPER_SNAKE_CASE"
    );
}

/// Runs [`assert_error_code`] over every variant in `errors`.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
