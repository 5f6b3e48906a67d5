//! Instructions and their execution contract.
//!
//! `execute(env, scheduler, parent, on_done)` spawns whatever processes
//! the instruction needs under `parent` and arranges for `on_done` to be
//! called exactly once with the outcome. It may be called synchronously
//! when the instruction cannot start at all.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use cotick_command::{Dispatcher, InputParser, Invocation, SpawnRequest};
use cotick_process::{ProcessId, Scheduler, SpawnSpec};
use cotick_types::{ProcessResult, Trigger};
use tracing::{debug, warn};

use crate::{RoutineError, Sequence, Template};

pub(crate) const WAIT_PROCESS: &str = "ar-wait";
pub(crate) const FOREVER_PROCESS: &str = "ar-forever";
pub(crate) const WHILE_PROCESS: &str = "ar-while";
/// `ar-forever` has no action, so its period only limits wasted wakeups.
const FOREVER_PERIOD: u32 = 100;

/// Called once when an instruction has finished.
pub type Completion = Box<dyn FnOnce(&mut Scheduler, ProcessResult)>;

/// What a running routine needs besides the scheduler.
#[derive(Clone)]
pub struct ExecEnv {
    dispatcher: Rc<Dispatcher>,
    args: Rc<[String]>,
}

impl ExecEnv {
    pub fn new(dispatcher: Rc<Dispatcher>, args: Vec<String>) -> Self {
        Self {
            dispatcher,
            args: args.into(),
        }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Rc<Dispatcher> {
        &self.dispatcher
    }

    /// Routine arguments, `$1` first.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub(crate) fn report(&self, message: String) {
        warn!("{message}");
        self.dispatcher.logger().log(message);
    }
}

impl fmt::Debug for ExecEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecEnv")
            .field("dispatcher", &self.dispatcher.name())
            .field("args", &self.args)
            .finish()
    }
}

/// One node of a routine.
#[derive(Debug, Clone)]
pub enum Instruction {
    Command(CommandInstruction),
    Wait(WaitInstruction),
    /// Never completes on its own.
    Forever,
    Sequence(Sequence),
    While(WhileInstruction),
}

impl Instruction {
    pub fn execute(
        &self,
        env: &ExecEnv,
        scheduler: &mut Scheduler,
        parent: ProcessId,
        on_done: Completion,
    ) {
        match self {
            Self::Command(command) => command.execute(env, scheduler, parent, on_done),
            Self::Wait(wait) => wait.execute(env, scheduler, parent, on_done),
            Self::Forever => {
                let spec = SpawnSpec::named(FOREVER_PROCESS).with_period(FOREVER_PERIOD);
                spawn_step(scheduler, parent, spec, on_done);
            }
            Self::Sequence(sequence) => sequence.execute(env, scheduler, parent, on_done),
            Self::While(looping) => looping.execute(env, scheduler, parent, on_done),
        }
    }

    /// Highest placeholder index used anywhere in this instruction.
    #[must_use]
    pub fn args_count(&self) -> usize {
        match self {
            Self::Command(command) => command.args_count(),
            Self::Wait(wait) => wait.args_count(),
            Self::Forever => 0,
            Self::Sequence(sequence) => sequence.args_count(),
            Self::While(looping) => looping.args_count(),
        }
    }
}

/// Spawns a step process under `parent` whose completion is `on_done`.
///
/// If the spawn fails (the parent is gone), the step completes at once
/// with `KO`.
pub(crate) fn spawn_step(
    scheduler: &mut Scheduler,
    parent: ProcessId,
    spec: SpawnSpec,
    on_done: Completion,
) -> Option<ProcessId> {
    // Shared with the failure path, since the spec owns the callback.
    let slot = Rc::new(Cell::new(Some(on_done)));
    let from_process = Rc::clone(&slot);
    let spec = spec.with_on_done(move |ctx, result| {
        if let Some(on_done) = from_process.take() {
            on_done(ctx.scheduler(), result);
        }
        Ok(())
    });
    match scheduler.spawn_child(parent, spec) {
        Ok(pid) => Some(pid),
        Err(e) => {
            warn!(parent = %parent, error = %e, "failed to spawn routine step");
            if let Some(on_done) = slot.take() {
                on_done(scheduler, ProcessResult::Failed);
            }
            None
        }
    }
}

/// Runs a registered command as a child of the routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInstruction {
    name: String,
    args: Vec<Template>,
    switches: BTreeSet<String>,
}

impl CommandInstruction {
    pub fn new(name: impl Into<String>, args: Vec<Template>) -> Self {
        Self {
            name: name.into(),
            args,
            switches: BTreeSet::new(),
        }
    }

    /// Parses a command line such as `-arm-drill "slow mode" $2`.
    ///
    /// # Errors
    ///
    /// [`RoutineError::CommandLine`] if the line does not tokenize,
    /// [`RoutineError::InvalidInstruction`] (line 0) if it is blank,
    /// [`RoutineError::InvalidPlaceholder`] for `$0`.
    pub fn parse(line: &str) -> Result<Self, RoutineError> {
        let invocation = InputParser::parse(line)?.ok_or_else(|| {
            RoutineError::InvalidInstruction {
                instruction: line.to_string(),
                line: 0,
                source: None,
            }
        })?;
        let args = invocation
            .args
            .iter()
            .map(|arg| Template::parse(arg))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            name: invocation.name,
            args,
            switches: invocation.switches,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn args(&self) -> &[Template] {
        &self.args
    }

    /// Switches passed through unchanged, such as `h` for `-cmd -h`.
    #[must_use]
    pub fn switches(&self) -> &BTreeSet<String> {
        &self.switches
    }

    #[must_use]
    pub fn args_count(&self) -> usize {
        self.args.iter().map(Template::arg_index).max().unwrap_or(0)
    }

    fn substitute(&self, args: &[String]) -> Option<Vec<String>> {
        self.args
            .iter()
            .map(|template| template.resolve(args).map(str::to_string))
            .collect()
    }

    fn execute(&self, env: &ExecEnv, scheduler: &mut Scheduler, parent: ProcessId, on_done: Completion) {
        if !scheduler.is_alive(parent) {
            debug!(parent = %parent, command = %self.name, "routine parent gone, command skipped");
            on_done(scheduler, ProcessResult::Failed);
            return;
        }
        let Some(args) = self.substitute(env.args()) else {
            env.report(format!("Missing routine argument for command '{}'", self.name));
            on_done(scheduler, ProcessResult::Failed);
            return;
        };

        // Dispatch consumes the request even when it fails, so the
        // completion is shared with the failure path.
        let slot = Rc::new(Cell::new(Some(on_done)));
        let from_process = Rc::clone(&slot);
        let request = SpawnRequest::new(Trigger::Cmd)
            .under(parent)
            .with_on_done(move |ctx, result| {
                if let Some(on_done) = from_process.take() {
                    on_done(ctx.scheduler(), result);
                }
                Ok(())
            });

        let invocation =
            Invocation::new(self.name.clone(), args).with_switches(self.switches.iter().cloned());
        if env
            .dispatcher()
            .start_invocation(scheduler, invocation, request)
            .is_err()
        {
            if let Some(on_done) = slot.take() {
                on_done(scheduler, ProcessResult::Failed);
            }
        }
    }
}

/// Completes after a number of ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitInstruction {
    duration: Template,
}

impl WaitInstruction {
    /// # Errors
    ///
    /// [`RoutineError::InvalidDuration`] if a literal duration is not a
    /// tick count.
    pub fn new(duration: Template) -> Result<Self, RoutineError> {
        if let Template::Literal(text) = &duration {
            if text.parse::<u32>().is_err() {
                return Err(RoutineError::InvalidDuration(text.clone()));
            }
        }
        Ok(Self { duration })
    }

    pub fn ticks(ticks: u32) -> Self {
        Self {
            duration: Template::Literal(ticks.to_string()),
        }
    }

    /// # Errors
    ///
    /// Same as [`Template::parse`] and [`new`](Self::new).
    pub fn parse(text: &str) -> Result<Self, RoutineError> {
        Self::new(Template::parse(text.trim())?)
    }

    #[must_use]
    pub fn duration(&self) -> &Template {
        &self.duration
    }

    #[must_use]
    pub fn args_count(&self) -> usize {
        self.duration.arg_index()
    }

    fn execute(&self, env: &ExecEnv, scheduler: &mut Scheduler, parent: ProcessId, on_done: Completion) {
        let ticks = self
            .duration
            .resolve(env.args())
            .and_then(|text| text.parse::<u32>().ok());
        let Some(ticks) = ticks else {
            env.report(format!("Invalid wait duration '{}'", self.duration));
            on_done(scheduler, ProcessResult::Failed);
            return;
        };
        let spec = SpawnSpec::named(WAIT_PROCESS).with_period(ticks).once();
        spawn_step(scheduler, parent, spec, on_done);
    }
}

/// Repeats `body` until `condition` completes.
///
/// Condition and body run side by side under one `ar-while` process.
#[derive(Debug, Clone)]
pub struct WhileInstruction {
    condition: Box<Instruction>,
    body: Sequence,
}

impl WhileInstruction {
    pub fn new(condition: Instruction, body: Vec<Instruction>) -> Self {
        Self {
            condition: Box::new(condition),
            body: Sequence::new(body),
        }
    }

    #[must_use]
    pub fn condition(&self) -> &Instruction {
        &self.condition
    }

    #[must_use]
    pub fn body(&self) -> &Sequence {
        &self.body
    }

    #[must_use]
    pub fn args_count(&self) -> usize {
        self.condition.args_count().max(self.body.args_count())
    }

    pub fn execute(
        &self,
        env: &ExecEnv,
        scheduler: &mut Scheduler,
        parent: ProcessId,
        on_done: Completion,
    ) {
        crate::sequence::run_while(self, env, scheduler, parent, on_done);
    }
}

impl From<CommandInstruction> for Instruction {
    fn from(instruction: CommandInstruction) -> Self {
        Self::Command(instruction)
    }
}

impl From<WaitInstruction> for Instruction {
    fn from(instruction: WaitInstruction) -> Self {
        Self::Wait(instruction)
    }
}

impl From<WhileInstruction> for Instruction {
    fn from(instruction: WhileInstruction) -> Self {
        Self::While(instruction)
    }
}

impl From<Sequence> for Instruction {
    fn from(sequence: Sequence) -> Self {
        Self::Sequence(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_parse_keeps_quoted_args() {
        let cmd = CommandInstruction::parse(r#"-cmd arg3  "test test"  $2"#).expect("should parse");
        assert_eq!(cmd.name(), "cmd");
        assert_eq!(
            cmd.args(),
            [
                Template::Literal("arg3".into()),
                Template::Literal("test test".into()),
                Template::Placeholder(2)
            ]
        );
        assert_eq!(cmd.args_count(), 2);
    }

    #[test]
    fn command_substitution() {
        let cmd = CommandInstruction::parse("-cmd $1 fixed $3").expect("should parse");
        let args: Vec<String> = ["a", "b", "c"].iter().map(|s| (*s).to_string()).collect();
        assert_eq!(
            cmd.substitute(&args),
            Some(vec!["a".into(), "fixed".into(), "c".into()])
        );
        assert_eq!(cmd.substitute(&args[..2]), None);
    }

    #[test]
    fn wait_rejects_words() {
        assert!(matches!(
            WaitInstruction::parse("soon"),
            Err(RoutineError::InvalidDuration(_))
        ));
        assert!(matches!(
            WaitInstruction::parse("$0"),
            Err(RoutineError::InvalidPlaceholder(_))
        ));
        assert_eq!(
            WaitInstruction::parse(" 10 ").expect("should parse"),
            WaitInstruction::ticks(10)
        );
    }

    #[test]
    fn args_count_takes_the_maximum() {
        let looping = WhileInstruction::new(
            WaitInstruction::parse("$3").expect("valid").into(),
            vec![CommandInstruction::parse("-cmd $1 $4").expect("valid").into()],
        );
        assert_eq!(looping.args_count(), 4);
        assert_eq!(Instruction::Forever.args_count(), 0);
    }
}
