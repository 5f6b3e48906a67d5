//! Commands the host adds to the dispatcher.

use std::path::PathBuf;
use std::rc::Rc;

use cotick_command::{Command, CommandError, CommandProcess, Dispatcher};
use cotick_process::ProcessError;
use tracing::info;

use crate::KvStore;

const ECHO: &str = "Prints its arguments
Arguments are joined with single spaces";

const SET: &str = "Stores a value
The value is kept in the save file when one is configured";

const GET: &str = "Prints a stored value";

const SAVE: &str = "Writes stored values to the save file";

pub(crate) fn register_all(
    dispatcher: &Rc<Dispatcher>,
    store: &KvStore,
    save_file: Option<PathBuf>,
) -> Result<(), CommandError> {
    dispatcher.register(echo())?;
    dispatcher.register(set(store.clone()))?;
    dispatcher.register(get(store.clone()))?;
    dispatcher.register(save(save_file))?;
    Ok(())
}

fn echo() -> Command {
    Command::new("echo", ECHO, |args, logger| {
        let logger = logger.clone();
        let text = args.collect::<Vec<_>>().join(" ");
        CommandProcess::run(move |_| {
            logger.log(&text);
            Ok(())
        })
    })
}

fn set(store: KvStore) -> Command {
    Command::new("set", SET, move |mut args, logger| {
        let store = store.clone();
        let logger = logger.clone();
        let key = args.next().unwrap_or_default();
        let value = args.next().unwrap_or_default();
        CommandProcess::run(move |_| {
            store.set(key.clone(), value.clone());
            logger.log(format!("{key} = {value}"));
            Ok(())
        })
    })
    .with_exact_args(2)
}

fn get(store: KvStore) -> Command {
    Command::new("get", GET, move |mut args, logger| {
        let store = store.clone();
        let logger = logger.clone();
        let key = args.next().unwrap_or_default();
        CommandProcess::run(move |_| {
            match store.get(&key) {
                Some(value) => logger.log(format!("{key} = {value}")),
                None => logger.log(format!("{key} is not set")),
            }
            Ok(())
        })
    })
    .with_exact_args(1)
}

fn save(save_file: Option<PathBuf>) -> Command {
    Command::new("save", SAVE, move |_, logger| {
        let save_file = save_file.clone();
        let logger = logger.clone();
        CommandProcess::run(move |ctx| {
            let Some(path) = &save_file else {
                logger.log("No save file configured");
                return Ok(());
            };
            let text = ctx
                .scheduler()
                .save()
                .map_err(|e| ProcessError::action(e.to_string()))?;
            std::fs::write(path, text).map_err(|e| {
                ProcessError::action(format!("failed to write '{}': {e}", path.display()))
            })?;
            info!(path = %path.display(), "state saved");
            logger.log(format!("Saved to {}", path.display()));
            Ok(())
        })
    })
    .with_exact_args(0)
}
