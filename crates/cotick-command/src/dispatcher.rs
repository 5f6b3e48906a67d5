//! Command registry and dispatch.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use cotick_process::{OnDone, ProcessContext, ProcessError, ProcessId, Scheduler};
use cotick_types::{ErrorCode, Logger, ProcessResult, Trigger};
use tracing::debug;

use crate::{builtin, Arguments, Command, CommandError, InputParser, Invocation};

/// How and where a dispatched command process is spawned.
pub struct SpawnRequest {
    pub trigger: Trigger,
    /// Completion callback of the command process.
    pub on_done: Option<OnDone>,
    /// Parent of the command process; `None` spawns a root.
    pub spawner: Option<ProcessId>,
}

impl SpawnRequest {
    pub fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            on_done: None,
            spawner: None,
        }
    }

    #[must_use]
    pub fn with_on_done<F>(mut self, on_done: F) -> Self
    where
        F: FnOnce(&mut ProcessContext<'_>, ProcessResult) -> Result<(), ProcessError> + 'static,
    {
        self.on_done = Some(Box::new(on_done));
        self
    }

    #[must_use]
    pub fn with_boxed_on_done(mut self, on_done: Option<OnDone>) -> Self {
        self.on_done = on_done;
        self
    }

    /// Spawns the command process as a child of `spawner`.
    #[must_use]
    pub fn under(mut self, spawner: ProcessId) -> Self {
        self.spawner = Some(spawner);
        self
    }
}

impl fmt::Debug for SpawnRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnRequest")
            .field("trigger", &self.trigger)
            .field("has_on_done", &self.on_done.is_some())
            .field("spawner", &self.spawner)
            .finish()
    }
}

/// Parses command lines and spawns the matching command processes.
///
/// The dispatcher does not own the scheduler: every dispatch borrows it,
/// so command actions and routines can start further commands from
/// inside a tick.
///
/// ```
/// use cotick_command::{Command, CommandProcess, Dispatcher, Trigger};
/// use cotick_process::{Logger, Scheduler};
///
/// let mut scheduler = Scheduler::new();
/// let dispatcher = Dispatcher::new("demo", Logger::silent());
/// dispatcher
///     .register(Command::new("noop", "Does nothing", |_, _| CommandProcess::new()).with_exact_args(0))
///     .unwrap();
///
/// let pid = dispatcher.start_cmd(&mut scheduler, "noop", Trigger::User).unwrap();
/// assert!(scheduler.is_alive(pid));
/// scheduler.tick();
/// assert!(!scheduler.contains(pid));
///
/// assert!(dispatcher.start_cmd(&mut scheduler, "noop extra", Trigger::User).is_err());
/// ```
pub struct Dispatcher {
    name: String,
    logger: Logger,
    commands: RefCell<BTreeMap<String, Rc<Command>>>,
}

impl Dispatcher {
    /// Creates a dispatcher with the built-in `help`, `kill` and `ps`
    /// commands registered.
    pub fn new(name: impl Into<String>, logger: Logger) -> Rc<Self> {
        let dispatcher = Rc::new(Self {
            name: name.into(),
            logger,
            commands: RefCell::new(BTreeMap::new()),
        });
        builtin::register_all(&dispatcher);
        dispatcher
            .logger
            .log(format!("'{}' initialized. Run 'help' for more info", dispatcher.name));
        dispatcher
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Adds a command to the registry.
    ///
    /// # Errors
    ///
    /// [`CommandError::Duplicate`] if the name is taken, or if two
    /// subcommands of `command` share a name.
    pub fn register(&self, command: Command) -> Result<(), CommandError> {
        if let Some(dup) = command.duplicate_subcommand() {
            return Err(CommandError::Duplicate(dup));
        }
        let mut commands = self.commands.borrow_mut();
        if commands.contains_key(command.name()) {
            return Err(CommandError::Duplicate(command.name().to_string()));
        }
        debug!(dispatcher = %self.name, command = %command.name(), "command registered");
        commands.insert(command.name().to_string(), Rc::new(command));
        Ok(())
    }

    #[must_use]
    pub fn command(&self, name: &str) -> Option<Rc<Command>> {
        self.commands.borrow().get(name).cloned()
    }

    /// Registered command names, sorted.
    #[must_use]
    pub fn command_names(&self) -> Vec<String> {
        self.commands.borrow().keys().cloned().collect()
    }

    /// Parses `line` and spawns the command as a root process.
    ///
    /// # Errors
    ///
    /// See [`start_invocation`](Self::start_invocation). A blank line
    /// returns [`CommandError::Empty`] without logging.
    pub fn start_cmd(
        &self,
        scheduler: &mut Scheduler,
        line: &str,
        trigger: Trigger,
    ) -> Result<ProcessId, CommandError> {
        self.start_cmd_with(scheduler, line, SpawnRequest::new(trigger))
    }

    /// Parses `line` and spawns the command as described by `request`.
    ///
    /// # Errors
    ///
    /// See [`start_invocation`](Self::start_invocation).
    pub fn start_cmd_with(
        &self,
        scheduler: &mut Scheduler,
        line: &str,
        request: SpawnRequest,
    ) -> Result<ProcessId, CommandError> {
        match InputParser::parse(line) {
            Ok(Some(invocation)) => self.start_invocation(scheduler, invocation, request),
            Ok(None) => Err(CommandError::Empty),
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    /// Spawns an already tokenized command.
    ///
    /// Every failure is written to the dispatcher's logger before being
    /// returned, and no process is created.
    ///
    /// # Errors
    ///
    /// - [`CommandError::UnknownCommand`] if nothing is registered under the name
    /// - [`CommandError::PermissionDenied`] if the trigger is too low
    /// - [`CommandError::WrongArity`] if the argument count is out of range
    /// - [`CommandError::MissingSubcommand`] / [`CommandError::UnknownSubcommand`]
    /// - [`CommandError::Help`] if `-h` was given; the help is logged instead
    /// - [`CommandError::Spawn`] if the spawner process is gone
    pub fn start_invocation(
        &self,
        scheduler: &mut Scheduler,
        invocation: Invocation,
        request: SpawnRequest,
    ) -> Result<ProcessId, CommandError> {
        let result = self.spawn_invocation(scheduler, invocation, request);
        match &result {
            Ok(pid) => debug!(dispatcher = %self.name, pid = %pid, "command started"),
            Err(err) => self.report(err),
        }
        result
    }

    fn spawn_invocation(
        &self,
        scheduler: &mut Scheduler,
        invocation: Invocation,
        request: SpawnRequest,
    ) -> Result<ProcessId, CommandError> {
        let command = self
            .command(&invocation.name)
            .ok_or(CommandError::UnknownCommand(invocation.name))?;
        let mut args = Arguments::new(invocation.args).with_switches(invocation.switches);
        let mut full_name = command.name().to_string();
        let leaf = command.resolve(&mut args, request.trigger, &mut full_name)?;

        let spec = leaf
            .provide(args, &self.logger)
            .into_spec(full_name)
            .with_boxed_on_done(request.on_done);
        Ok(scheduler.spawn_under(request.spawner, spec)?)
    }

    /// Text printed by `help`, for every command or for one.
    #[must_use]
    pub fn help_lines(&self, topic: Option<&str>) -> Vec<String> {
        match topic {
            None => {
                let commands = self.commands.borrow();
                let mut lines = vec![format!("Available commands on {}:", self.name)];
                lines.extend(
                    commands
                        .values()
                        .filter(|c| c.required_trigger() != Trigger::Cmd)
                        .map(|c| format!("{}: {}", c.name(), c.brief())),
                );
                lines
            }
            Some(name) => match self.command(name) {
                Some(command) => command.help_lines(name),
                None => vec![unknown_command(name)],
            },
        }
    }

    fn report(&self, err: &CommandError) {
        let message = match err {
            CommandError::Empty => return,
            CommandError::Parse { line, reason } => format!("Failed to parse {line}: {reason}"),
            CommandError::UnknownCommand(name) => unknown_command(name),
            CommandError::PermissionDenied { command, .. } => {
                format!("Permission denied for \"{command}\"")
            }
            CommandError::WrongArity {
                command, expected, ..
            } => format!(
                "Wrong number of arguments for \"{command}\" ({expected}). {}",
                help_hint(command)
            ),
            CommandError::MissingSubcommand(command) => {
                format!("Expected subcommand for \"{command}\". {}", help_hint(command))
            }
            CommandError::UnknownSubcommand {
                command,
                subcommand,
            } => format!(
                "Invalid subcommand \"{subcommand}\" for \"{command}\". {}",
                help_hint(command)
            ),
            CommandError::Help { lines, .. } => {
                for line in lines {
                    self.logger.log(line);
                }
                return;
            }
            CommandError::Duplicate(name) => format!("Command \"{name}\" is already registered"),
            CommandError::Spawn(e) => format!("Could not start command: {e}"),
        };
        debug!(dispatcher = %self.name, code = err.code(), "command rejected");
        self.logger.log(message);
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("name", &self.name)
            .field("commands", &self.command_names())
            .finish_non_exhaustive()
    }
}

fn unknown_command(name: &str) -> String {
    format!("Unknown command \"{name}\". Run 'help' for more info.")
}

fn help_hint(full_name: &str) -> String {
    let root = full_name.split(' ').next().unwrap_or(full_name);
    format!("Run 'help {root}' for more info.")
}
