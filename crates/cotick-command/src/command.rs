//! Command definitions.
//!
//! A [`Command`] is either a leaf, which owns an [`ActionProvider`] and an
//! argument range, or a parent, which forwards to one of its subcommands
//! (`ar execute`, `ar list`). Both carry a required [`Trigger`] and help
//! text whose first line is the brief shown by `help`.

use std::fmt;

use cotick_process::{Action, ProcessContext, ProcessError, SpawnSpec};
use cotick_types::{Logger, Trigger};

use crate::{Arguments, CommandError};

/// Turns validated arguments into the process that performs a command.
pub type ActionProvider = Box<dyn Fn(Arguments, &Logger) -> CommandProcess>;

/// Action, period and once flag of a command process.
///
/// Defaults to a `once` process with period 1 and no action, which
/// completes on the tick after it was started.
pub struct CommandProcess {
    action: Option<Action>,
    period: u32,
    once: bool,
}

impl CommandProcess {
    pub fn new() -> Self {
        Self {
            action: None,
            period: 1,
            once: true,
        }
    }

    /// A process running `action` a single time.
    pub fn run<F>(action: F) -> Self
    where
        F: FnMut(&mut ProcessContext<'_>) -> Result<(), ProcessError> + 'static,
    {
        Self::new().with_action(action)
    }

    /// A process running `action` every `period` ticks until stopped.
    pub fn periodic<F>(period: u32, action: F) -> Self
    where
        F: FnMut(&mut ProcessContext<'_>) -> Result<(), ProcessError> + 'static,
    {
        Self::new()
            .with_action(action)
            .with_period(period)
            .with_once(false)
    }

    #[must_use]
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: FnMut(&mut ProcessContext<'_>) -> Result<(), ProcessError> + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    #[must_use]
    pub fn with_period(mut self, period: u32) -> Self {
        self.period = period.max(1);
        self
    }

    #[must_use]
    pub fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    #[must_use]
    pub fn period(&self) -> u32 {
        self.period
    }

    #[must_use]
    pub fn is_once(&self) -> bool {
        self.once
    }

    pub(crate) fn into_spec(self, name: String) -> SpawnSpec {
        SpawnSpec::named(name)
            .with_period(self.period)
            .with_once(self.once)
            .with_boxed_action(self.action)
    }
}

impl Default for CommandProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandProcess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandProcess")
            .field("period", &self.period)
            .field("once", &self.once)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

enum Kind {
    Leaf {
        provider: ActionProvider,
        min_args: usize,
        max_args: Option<usize>,
    },
    Parent {
        subcommands: Vec<Command>,
    },
}

/// A named, permission-checked command.
///
/// ```
/// use cotick_command::{Command, CommandProcess, Trigger};
///
/// let cmd = Command::new("move", "Moves the arm\nTakes a target and a speed", |_args, _log| {
///     CommandProcess::new()
/// })
/// .with_exact_args(2)
/// .with_trigger(Trigger::Cmd);
///
/// assert_eq!(cmd.brief(), "Moves the arm");
/// assert_eq!(cmd.argument_phrase().as_deref(), Some("Takes 2 arguments"));
/// ```
pub struct Command {
    name: String,
    help: Vec<String>,
    trigger: Trigger,
    kind: Kind,
}

impl Command {
    /// Creates a leaf command accepting any number of arguments.
    ///
    /// `help` is split on newlines: the first line is the brief, the
    /// others are printed by `help <name>`.
    pub fn new<F>(name: impl Into<String>, help: &str, provider: F) -> Self
    where
        F: Fn(Arguments, &Logger) -> CommandProcess + 'static,
    {
        Self {
            name: name.into(),
            help: split_help(help),
            trigger: Trigger::default(),
            kind: Kind::Leaf {
                provider: Box::new(provider),
                min_args: 0,
                max_args: None,
            },
        }
    }

    /// Creates a command that delegates to subcommands.
    pub fn parent(name: impl Into<String>, help: &str) -> Self {
        Self {
            name: name.into(),
            help: split_help(help),
            trigger: Trigger::default(),
            kind: Kind::Parent {
                subcommands: Vec::new(),
            },
        }
    }

    /// Adds a subcommand. Ignored with a warning on leaf commands.
    #[must_use]
    pub fn with_subcommand(mut self, sub: Command) -> Self {
        match &mut self.kind {
            Kind::Parent { subcommands } => subcommands.push(sub),
            Kind::Leaf { .. } => {
                tracing::warn!(command = %self.name, sub = %sub.name, "ignoring subcommand of leaf command");
            }
        }
        self
    }

    /// Sets the accepted argument range; `None` means unbounded.
    #[must_use]
    pub fn with_args(mut self, min: usize, max: Option<usize>) -> Self {
        if let Kind::Leaf {
            min_args, max_args, ..
        } = &mut self.kind
        {
            *min_args = min;
            *max_args = max.map(|m| m.max(min));
        }
        self
    }

    #[must_use]
    pub fn with_exact_args(self, n: usize) -> Self {
        self.with_args(n, Some(n))
    }

    #[must_use]
    pub fn with_min_args(self, min: usize) -> Self {
        self.with_args(min, None)
    }

    #[must_use]
    pub fn with_max_args(self, max: usize) -> Self {
        self.with_args(0, Some(max))
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = trigger;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn brief(&self) -> &str {
        self.help.first().map_or("", String::as_str)
    }

    /// Help lines after the brief.
    #[must_use]
    pub fn detailed_help(&self) -> &[String] {
        self.help.get(1..).unwrap_or_default()
    }

    #[must_use]
    pub fn required_trigger(&self) -> Trigger {
        self.trigger
    }

    #[must_use]
    pub fn is_parent(&self) -> bool {
        matches!(self.kind, Kind::Parent { .. })
    }

    #[must_use]
    pub fn subcommand(&self, name: &str) -> Option<&Command> {
        match &self.kind {
            Kind::Parent { subcommands } => subcommands.iter().find(|c| c.name == name),
            Kind::Leaf { .. } => None,
        }
    }

    /// Subcommand names in registration order.
    #[must_use]
    pub fn subcommand_names(&self) -> Vec<&str> {
        match &self.kind {
            Kind::Parent { subcommands } => subcommands.iter().map(|c| c.name.as_str()).collect(),
            Kind::Leaf { .. } => Vec::new(),
        }
    }

    /// Human readable argument range, `None` for parent commands.
    ///
    /// | min | max | phrase |
    /// |-----|-----|--------|
    /// | 0 | 0 | `Takes no arguments` |
    /// | 1 | 1 | `Takes 1 argument` |
    /// | 0 | ∞ | `Takes any number of arguments` |
    /// | 0 | 4 | `Takes up to 4 arguments` |
    /// | 2 | 4 | `Takes 2-4 arguments` |
    /// | 2 | ∞ | `Takes at least 2 arguments` |
    #[must_use]
    pub fn argument_phrase(&self) -> Option<String> {
        let Kind::Leaf {
            min_args, max_args, ..
        } = &self.kind
        else {
            return None;
        };
        let (min, max) = (*min_args, *max_args);
        let count = match max {
            Some(0) => return Some("Takes no arguments".to_string()),
            Some(max) if max == min => max.to_string(),
            Some(max) if min == 0 => format!("up to {max}"),
            Some(max) => format!("{min}-{max}"),
            None if min == 0 => "any number of".to_string(),
            None => format!("at least {min}"),
        };
        let plural = if max == Some(1) { "" } else { "s" };
        Some(format!("Takes {count} argument{plural}"))
    }

    /// Full help block printed by `help <name>`.
    pub(crate) fn help_lines(&self, full_name: &str) -> Vec<String> {
        let mut lines = vec![format!("{full_name}: {}", self.brief())];
        lines.extend(self.detailed_help().iter().map(|l| format!("  {l}")));
        match self.argument_phrase() {
            Some(phrase) => lines.push(format!("  {phrase}")),
            None => {
                lines.push("  Available subcommands are:".to_string());
                lines.push(format!("  {}", self.subcommand_names().join(", ")));
            }
        }
        lines
    }

    /// Walks down to the leaf addressed by `args`, consuming subcommand
    /// names and checking the trigger and the argument count.
    ///
    /// With `-h`, the first command that cannot go further (the leaf, or
    /// a parent missing its subcommand) answers with its help block.
    ///
    /// `path` holds the full name of `self` on entry and of the returned
    /// leaf on exit.
    pub(crate) fn resolve(
        &self,
        args: &mut Arguments,
        trigger: Trigger,
        path: &mut String,
    ) -> Result<&Command, CommandError> {
        if !trigger.allows(self.trigger) {
            return Err(CommandError::PermissionDenied {
                command: path.clone(),
                required: self.trigger,
                trigger,
            });
        }
        match &self.kind {
            Kind::Parent { subcommands } => {
                let Some(name) = args.next() else {
                    let err = CommandError::MissingSubcommand(path.clone());
                    return Err(self.help_or(args, path, err));
                };
                let Some(sub) = subcommands.iter().find(|c| c.name == name) else {
                    let err = CommandError::UnknownSubcommand {
                        command: path.clone(),
                        subcommand: name,
                    };
                    return Err(self.help_or(args, path, err));
                };
                path.push(' ');
                path.push_str(&sub.name);
                sub.resolve(args, trigger, path)
            }
            Kind::Leaf {
                min_args, max_args, ..
            } => {
                let given = args.remaining();
                let out_of_range = given < *min_args || max_args.is_some_and(|max| given > max);
                if out_of_range || args.has_switch("h") {
                    let err = CommandError::WrongArity {
                        command: path.clone(),
                        given,
                        expected: self.argument_phrase().unwrap_or_default(),
                    };
                    return Err(self.help_or(args, path, err));
                }
                Ok(self)
            }
        }
    }

    /// The help block of this command when `-h` was given, `err` otherwise.
    fn help_or(&self, args: &Arguments, path: &str, err: CommandError) -> CommandError {
        if args.has_switch("h") {
            CommandError::Help {
                command: path.to_string(),
                lines: self.help_lines(path),
            }
        } else {
            err
        }
    }

    /// Runs the provider of a resolved leaf.
    pub(crate) fn provide(&self, args: Arguments, logger: &Logger) -> CommandProcess {
        match &self.kind {
            Kind::Leaf { provider, .. } => provider(args, logger),
            Kind::Parent { .. } => CommandProcess::new(),
        }
    }

    /// First duplicated subcommand name anywhere below this command.
    pub(crate) fn duplicate_subcommand(&self) -> Option<String> {
        let Kind::Parent { subcommands } = &self.kind else {
            return None;
        };
        for (i, sub) in subcommands.iter().enumerate() {
            if subcommands[..i].iter().any(|c| c.name == sub.name) {
                return Some(format!("{} {}", self.name, sub.name));
            }
            if let Some(dup) = sub.duplicate_subcommand() {
                return Some(format!("{} {dup}", self.name));
            }
        }
        None
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .field("brief", &self.brief())
            .field("subcommands", &self.subcommand_names())
            .finish_non_exhaustive()
    }
}

fn split_help(help: &str) -> Vec<String> {
    help.lines().map(str::to_string).collect()
}
