//! Named, parameterized routines.

use cotick_process::{ProcessId, Scheduler, SpawnSpec};

use crate::instruction::spawn_step;
use crate::{Completion, ExecEnv, Instruction, Sequence};

/// A named sequence of instructions.
#[derive(Debug, Clone)]
pub struct AutoRoutine {
    name: String,
    body: Sequence,
}

impl AutoRoutine {
    pub fn new(name: impl Into<String>, instructions: Vec<Instruction>) -> Self {
        Self {
            name: name.into(),
            body: Sequence::new(instructions),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        self.body.instructions()
    }

    /// Number of arguments the routine must be started with.
    #[must_use]
    pub fn args_count(&self) -> usize {
        self.body.args_count()
    }

    /// Runs the routine under a dedicated `ar-execute <name>` child of
    /// `parent`, which finishes when the last instruction completes.
    ///
    /// The extra process keeps the routine alive when `parent` is a
    /// short-lived command process, and gives `kill` a name to target.
    pub fn execute(
        &self,
        env: &ExecEnv,
        scheduler: &mut Scheduler,
        parent: ProcessId,
        on_done: Completion,
    ) {
        let spec = SpawnSpec::named(format!("ar-execute {}", self.name));
        let Some(pid) = spawn_step(scheduler, parent, spec, on_done) else {
            return;
        };
        tracing::debug!(routine = %self.name, pid = %pid, "routine started");
        self.body
            .execute(env, scheduler, pid, Box::new(move |scheduler, _| scheduler.done(pid)));
    }
}
