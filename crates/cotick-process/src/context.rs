//! Handle passed to process callbacks.

use crate::{Logger, ProcessError, ProcessId, Scheduler, SpawnSpec};

/// The running process plus mutable access to its scheduler.
///
/// Actions and completion callbacks receive a context instead of a
/// reference to their own record, so they can freely spawn, finish or
/// kill any process (themselves included) without aliasing the arena.
pub struct ProcessContext<'a> {
    scheduler: &'a mut Scheduler,
    pid: ProcessId,
}

impl<'a> ProcessContext<'a> {
    pub(crate) fn new(scheduler: &'a mut Scheduler, pid: ProcessId) -> Self {
        Self { scheduler, pid }
    }

    /// Id of the process this callback belongs to.
    #[must_use]
    pub fn id(&self) -> ProcessId {
        self.pid
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.scheduler.name(self.pid).unwrap_or_default()
    }

    pub fn scheduler(&mut self) -> &mut Scheduler {
        &mut *self.scheduler
    }

    #[must_use]
    pub fn logger(&self) -> Logger {
        self.scheduler.logger().clone()
    }

    /// Spawns a child of the current process.
    ///
    /// # Errors
    ///
    /// Returns [`ProcessError::NotAlive`] when called from a completion
    /// callback or after the process finished.
    pub fn spawn(&mut self, spec: SpawnSpec) -> Result<ProcessId, ProcessError> {
        self.scheduler.spawn_child(self.pid, spec)
    }

    pub fn done(&mut self) {
        self.scheduler.done(self.pid);
    }

    pub fn fail(&mut self) {
        self.scheduler.fail(self.pid);
    }

    pub fn kill(&mut self) {
        self.scheduler.kill(self.pid);
    }

    pub fn kill_children(&mut self) {
        self.scheduler.kill_children(self.pid);
    }

    pub fn reset_counter(&mut self, value: u32) {
        self.scheduler.reset_counter(self.pid, value);
    }
}
