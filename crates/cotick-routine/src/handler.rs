//! The `ar` command: lists and starts routines.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use cotick_command::{Command, CommandError, CommandProcess, Dispatcher};
use cotick_types::Logger;

use crate::{AutoRoutine, ExecEnv, RoutineError};

type Registry = Rc<RefCell<BTreeMap<String, Rc<AutoRoutine>>>>;

/// Routine registry exposed through `ar execute` and `ar list`.
///
/// ```
/// use cotick_command::{Dispatcher, Trigger};
/// use cotick_process::{Logger, Scheduler};
/// use cotick_routine::{RoutineHandler, RoutineParser};
///
/// let dispatcher = Dispatcher::new("demo", Logger::silent());
/// let handler = RoutineHandler::register(&dispatcher).unwrap();
/// handler
///     .add_routines(RoutineParser::parse("= nap\nwait $1").unwrap())
///     .unwrap();
///
/// let mut scheduler = Scheduler::new();
/// dispatcher
///     .start_cmd(&mut scheduler, "ar execute nap 3", Trigger::User)
///     .unwrap();
/// for _ in 0..3 {
///     scheduler.tick();
/// }
/// assert_eq!(scheduler.find_by_name("ar-wait").len(), 1);
/// scheduler.tick();
/// assert!(scheduler.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct RoutineHandler {
    routines: Registry,
}

impl RoutineHandler {
    /// Registers the `ar` command on `dispatcher`.
    ///
    /// # Errors
    ///
    /// [`CommandError::Duplicate`] if `ar` is already registered.
    pub fn register(dispatcher: &Rc<Dispatcher>) -> Result<Self, CommandError> {
        let routines: Registry = Rc::default();
        dispatcher.register(
            Command::parent("ar", "Interacts with the routines")
                .with_subcommand(execute_command(Rc::downgrade(dispatcher), Rc::clone(&routines)))
                .with_subcommand(list_command(Rc::clone(&routines))),
        )?;
        Ok(Self { routines })
    }

    /// Adds routines, typically the output of
    /// [`RoutineParser::parse`](crate::RoutineParser::parse).
    ///
    /// # Errors
    ///
    /// [`RoutineError::Duplicate`] on the first name already known;
    /// routines before it are kept.
    pub fn add_routines(&self, routines: Vec<AutoRoutine>) -> Result<(), RoutineError> {
        let mut registry = self.routines.borrow_mut();
        for routine in routines {
            if registry.contains_key(routine.name()) {
                return Err(RoutineError::Duplicate(routine.name().to_string()));
            }
            tracing::debug!(routine = %routine.name(), args = routine.args_count(), "routine added");
            registry.insert(routine.name().to_string(), Rc::new(routine));
        }
        Ok(())
    }

    #[must_use]
    pub fn routine(&self, name: &str) -> Option<Rc<AutoRoutine>> {
        self.routines.borrow().get(name).cloned()
    }

    /// Routine names, sorted.
    #[must_use]
    pub fn routine_names(&self) -> Vec<String> {
        self.routines.borrow().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routines.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routines.borrow().is_empty()
    }
}

fn plural(count: usize) -> &'static str {
    if count > 1 {
        "s"
    } else {
        ""
    }
}

fn execute_command(dispatcher: Weak<Dispatcher>, routines: Registry) -> Command {
    Command::new(
        "execute",
        "Executes a routine\nThe first argument is the routine name, the others its arguments",
        move |args, logger| {
            let dispatcher = dispatcher.clone();
            let routines = Rc::clone(&routines);
            let logger = logger.clone();
            let mut args = args;
            let name = args.next().unwrap_or_default();
            let routine_args: Vec<String> = args.collect();
            CommandProcess::run(move |ctx| {
                let Some(dispatcher) = dispatcher.upgrade() else {
                    return Ok(());
                };
                let Some(routine) = routines.borrow().get(&name).cloned() else {
                    logger.log(format!("Could not find routine '{name}'"));
                    return Ok(());
                };
                let argc = routine.args_count();
                if routine_args.len() < argc {
                    logger.log(format!("Routine '{name}' needs {argc} argument{}", plural(argc)));
                    return Ok(());
                }
                let env = ExecEnv::new(dispatcher, routine_args.clone());
                let pid = ctx.id();
                let log = logger.clone();
                let finished = name.clone();
                routine.execute(
                    &env,
                    ctx.scheduler(),
                    pid,
                    Box::new(move |_, result| {
                        tracing::debug!(routine = %finished, result = %result, "routine finished");
                        if !result.is_ok() {
                            log.log(format!("Routine '{finished}' ended with {result}"));
                        }
                    }),
                );
                Ok(())
            })
        },
    )
    .with_min_args(1)
}

fn list_command(routines: Registry) -> Command {
    Command::new("list", "Lists all the routines", move |_, logger: &Logger| {
        let routines = Rc::clone(&routines);
        let logger = logger.clone();
        CommandProcess::run(move |_| {
            logger.log("Available routines:");
            for (name, routine) in routines.borrow().iter() {
                let argc = routine.args_count();
                let count = if argc == 0 {
                    "no".to_string()
                } else {
                    argc.to_string()
                };
                logger.log(format!("  '{name}': takes {count} argument{}", plural(argc)));
            }
            Ok(())
        })
    })
    .with_exact_args(0)
}
