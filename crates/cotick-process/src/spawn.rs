//! Process construction parameters.

use crate::{ProcessContext, ProcessError, ProcessResult, SaveState};
use std::fmt;

/// Callback run each time a process fires.
pub type Action = Box<dyn FnMut(&mut ProcessContext<'_>) -> Result<(), ProcessError>>;

/// Callback run once when a process stops being alive.
pub type OnDone =
    Box<dyn FnOnce(&mut ProcessContext<'_>, ProcessResult) -> Result<(), ProcessError>>;

/// Callback contributing key/value pairs when the host saves state.
pub type SaveHook = Box<dyn Fn(&mut SaveState)>;

/// Builder describing a process to spawn.
///
/// ```
/// use cotick_process::SpawnSpec;
///
/// let spec = SpawnSpec::named("poll")
///     .with_period(10)
///     .with_action(|_ctx| Ok(()));
/// assert_eq!(spec.period(), 10);
/// assert!(!spec.is_once());
/// ```
#[derive(Default)]
pub struct SpawnSpec {
    pub(crate) name: Option<String>,
    pub(crate) period: u32,
    pub(crate) once: bool,
    pub(crate) action: Option<Action>,
    pub(crate) on_done: Option<OnDone>,
}

impl SpawnSpec {
    /// Creates an unnamed, periodic (period 1) spec without callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            period: 1,
            ..Self::default()
        }
    }

    /// Creates a spec with the given name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::new().with_name(name)
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the number of ticks between fires. Values below 1 become 1.
    #[must_use]
    pub fn with_period(mut self, period: u32) -> Self {
        self.period = period.max(1);
        self
    }

    /// Marks the process as finished right after its first fire.
    #[must_use]
    pub fn once(self) -> Self {
        self.with_once(true)
    }

    #[must_use]
    pub fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    #[must_use]
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: FnMut(&mut ProcessContext<'_>) -> Result<(), ProcessError> + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    /// Replaces the action with an already boxed one (or none).
    #[must_use]
    pub fn with_boxed_action(mut self, action: Option<Action>) -> Self {
        self.action = action;
        self
    }

    #[must_use]
    pub fn with_on_done<F>(mut self, on_done: F) -> Self
    where
        F: FnOnce(&mut ProcessContext<'_>, ProcessResult) -> Result<(), ProcessError> + 'static,
    {
        self.on_done = Some(Box::new(on_done));
        self
    }

    /// Replaces the completion callback with an already boxed one (or none).
    #[must_use]
    pub fn with_boxed_on_done(mut self, on_done: Option<OnDone>) -> Self {
        self.on_done = on_done;
        self
    }

    #[must_use]
    pub fn period(&self) -> u32 {
        self.period.max(1)
    }

    #[must_use]
    pub fn is_once(&self) -> bool {
        self.once
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Debug for SpawnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnSpec")
            .field("name", &self.name)
            .field("period", &self.period)
            .field("once", &self.once)
            .field("has_action", &self.action.is_some())
            .field("has_on_done", &self.on_done.is_some())
            .finish()
    }
}
