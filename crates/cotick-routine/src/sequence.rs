//! Compound instructions as explicit state machines.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cotick_process::{ProcessId, Scheduler, SpawnSpec};
use cotick_types::ProcessResult;
use tracing::debug;

use crate::instruction::{spawn_step, WHILE_PROCESS};
use crate::{Completion, ExecEnv, Instruction, WhileInstruction};

/// Instructions run one after the other.
#[derive(Debug, Clone)]
pub struct Sequence {
    instructions: Rc<[Instruction]>,
}

impl Sequence {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions: instructions.into(),
        }
    }

    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    #[must_use]
    pub fn args_count(&self) -> usize {
        self.instructions
            .iter()
            .map(Instruction::args_count)
            .max()
            .unwrap_or(0)
    }

    /// Starts the first instruction under `parent`.
    ///
    /// Each completion starts the next instruction, as long as `parent`
    /// is still active; `on_done` receives the result of the last one.
    /// An empty sequence completes immediately.
    pub fn execute(
        &self,
        env: &ExecEnv,
        scheduler: &mut Scheduler,
        parent: ProcessId,
        on_done: Completion,
    ) {
        let run = Rc::new(RefCell::new(SequenceRun {
            instructions: Rc::clone(&self.instructions),
            env: env.clone(),
            parent,
            step: Step::NotStarted,
            on_done: Some(on_done),
        }));
        SequenceRun::resume(&run, scheduler, ProcessResult::Ok);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    NotStarted,
    Running(usize),
    Done,
}

struct SequenceRun {
    instructions: Rc<[Instruction]>,
    env: ExecEnv,
    parent: ProcessId,
    step: Step,
    on_done: Option<Completion>,
}

enum Next {
    Start(usize),
    Complete(Completion),
    Stop,
}

impl SequenceRun {
    fn resume(run: &Rc<RefCell<Self>>, scheduler: &mut Scheduler, last: ProcessResult) {
        // The borrow must end before an instruction starts: it may
        // complete synchronously and re-enter here.
        let next = {
            let mut this = run.borrow_mut();
            if !scheduler.is_active(this.parent) {
                this.step = Step::Done;
                this.on_done = None;
                Next::Stop
            } else {
                let index = match this.step {
                    Step::NotStarted => 0,
                    Step::Running(i) => i + 1,
                    Step::Done => return,
                };
                if index < this.instructions.len() {
                    this.step = Step::Running(index);
                    Next::Start(index)
                } else {
                    this.step = Step::Done;
                    this.on_done.take().map_or(Next::Stop, Next::Complete)
                }
            }
        };

        match next {
            Next::Start(index) => {
                let (instructions, env, parent) = {
                    let this = run.borrow();
                    (Rc::clone(&this.instructions), this.env.clone(), this.parent)
                };
                let again = Rc::clone(run);
                instructions[index].execute(
                    &env,
                    scheduler,
                    parent,
                    Box::new(move |scheduler, result| Self::resume(&again, scheduler, result)),
                );
            }
            Next::Complete(on_done) => on_done(scheduler, last),
            Next::Stop => {}
        }
    }
}

/// Runs a `while` block.
///
/// The `ar-while` process owns condition and body and is the only place
/// the block completes from, so its successor is started exactly once
/// whether the condition ends the loop or the process is killed.
pub(crate) fn run_while(
    instruction: &WhileInstruction,
    env: &ExecEnv,
    scheduler: &mut Scheduler,
    parent: ProcessId,
    on_done: Completion,
) {
    let ended_by_condition = Rc::new(Cell::new(false));
    let body = Rc::new(BodyLoop {
        body: instruction.body().clone(),
        env: env.clone(),
        starting: Cell::new(false),
        deferred: Cell::new(false),
    });

    let restart = Rc::clone(&body);
    let ended = Rc::clone(&ended_by_condition);
    let spec = SpawnSpec::named(WHILE_PROCESS).with_action(move |ctx| {
        if restart.deferred.replace(false) {
            let pid = ctx.id();
            BodyLoop::start(&restart, ctx.scheduler(), pid);
        }
        Ok(())
    });
    let completion: Completion = Box::new(move |scheduler, result| {
        let result = if ended.get() { ProcessResult::Ok } else { result };
        on_done(scheduler, result);
    });
    let Some(while_pid) = spawn_step(scheduler, parent, spec, completion) else {
        return;
    };

    BodyLoop::start(&body, scheduler, while_pid);

    let ended = Rc::clone(&ended_by_condition);
    instruction.condition().execute(
        env,
        scheduler,
        while_pid,
        Box::new(move |scheduler, _| {
            // Also reached while a kill of `ar-while` cascades into the
            // condition; the loop is then already ending.
            if scheduler.is_alive(while_pid) {
                ended.set(true);
                scheduler.kill(while_pid);
            }
        }),
    );
}

struct BodyLoop {
    body: Sequence,
    env: ExecEnv,
    /// Set while `start` runs.
    starting: Cell<bool>,
    /// Restart requested by a body that completed inside `start`.
    deferred: Cell<bool>,
}

impl BodyLoop {
    fn start(this: &Rc<Self>, scheduler: &mut Scheduler, while_pid: ProcessId) {
        this.starting.set(true);
        let again = Rc::clone(this);
        this.body.execute(
            &this.env,
            scheduler,
            while_pid,
            Box::new(move |scheduler, _| Self::finished(&again, scheduler, while_pid)),
        );
        this.starting.set(false);
    }

    fn finished(this: &Rc<Self>, scheduler: &mut Scheduler, while_pid: ProcessId) {
        if !scheduler.is_active(while_pid) {
            return;
        }
        if this.starting.get() {
            // Completed without yielding; restart on the next tick.
            debug!(pid = %while_pid, "while body completed immediately, deferring restart");
            this.deferred.set(true);
        } else {
            Self::start(this, scheduler, while_pid);
        }
    }
}
