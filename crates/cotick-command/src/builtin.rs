//! Commands every dispatcher starts with.

use std::rc::{Rc, Weak};

use cotick_process::ProcessId;

use crate::{Command, CommandProcess, Dispatcher};

const HELP: &str = "Displays this help or help on a command
Without argument, lists the available commands
With a command name, gives the detailed help on that command";

const KILL: &str = "Kills processes by id or by name
A positive number kills the process with that id
Anything else kills every process with that name";

const PS: &str = "Lists alive processes";

pub(crate) fn register_all(dispatcher: &Rc<Dispatcher>) {
    for command in [help(Rc::downgrade(dispatcher)), kill(), ps()] {
        if let Err(e) = dispatcher.register(command) {
            tracing::error!(error = %e, "failed to register built-in command");
        }
    }
}

fn help(dispatcher: Weak<Dispatcher>) -> Command {
    Command::new("help", HELP, move |args, logger| {
        let dispatcher = dispatcher.clone();
        let logger = logger.clone();
        let topic = args.peek().map(str::to_string);
        CommandProcess::run(move |_| {
            if let Some(dispatcher) = dispatcher.upgrade() {
                for line in dispatcher.help_lines(topic.as_deref()) {
                    logger.log(line);
                }
            }
            Ok(())
        })
    })
    .with_max_args(1)
}

fn kill() -> Command {
    Command::new("kill", KILL, |mut args, _| {
        let target = args.next().unwrap_or_default();
        CommandProcess::run(move |ctx| {
            match target.parse::<u64>() {
                Ok(id) if id > 0 => ctx.scheduler().kill(ProcessId::new(id)),
                _ => ctx.scheduler().kill_all_named(&target),
            }
            Ok(())
        })
    })
    .with_exact_args(1)
}

fn ps() -> Command {
    Command::new("ps", PS, |_, logger| {
        let logger = logger.clone();
        CommandProcess::run(move |ctx| {
            ctx.scheduler().log_to(&logger);
            Ok(())
        })
    })
    .with_exact_args(0)
}
