//! The host: one scheduler, one dispatcher, the routines and the store.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use cotick_command::{CommandError, Dispatcher};
use cotick_process::{ProcessId, SaveState, Scheduler};
use cotick_routine::{RoutineHandler, RoutineParser};
use cotick_types::{Logger, Trigger};
use tracing::{debug, info};

use crate::config::CotickConfig;
use crate::{commands, HostError, KvStore};

/// Dispatcher name shown by `help`.
pub const DISPATCHER_NAME: &str = "cotick";

/// Everything a session needs, built from a [`CotickConfig`].
///
/// Startup loads the routine document and restores the store from the
/// save file when those paths are configured; a missing save file is
/// an empty store.
#[derive(Debug)]
pub struct Host {
    config: CotickConfig,
    scheduler: Scheduler,
    dispatcher: Rc<Dispatcher>,
    routines: RoutineHandler,
    store: KvStore,
}

impl Host {
    /// # Errors
    ///
    /// Returns [`HostError`] if the routine document or the save file
    /// cannot be read or parsed.
    pub fn new(config: CotickConfig, logger: Logger) -> Result<Self, HostError> {
        let mut scheduler = Scheduler::new().with_logger(logger.clone());
        scheduler.set_smart(config.scheduler.smart);

        let dispatcher = Dispatcher::new(DISPATCHER_NAME, logger);
        let routines = RoutineHandler::register(&dispatcher)?;
        if let Some(path) = &config.paths.routines {
            load_routines(&routines, path)?;
        }

        let store = KvStore::new();
        if let Some(path) = &config.paths.save_file {
            if let Some(state) = read_save_file(path)? {
                store.restore(&state);
                info!(path = %path.display(), values = store.len(), "state restored");
            }
        }
        let saved = store.clone();
        scheduler.add_on_save(move |state| saved.write_to(state));

        commands::register_all(&dispatcher, &store, config.paths.save_file.clone())?;

        Ok(Self {
            config,
            scheduler,
            dispatcher,
            routines,
            store,
        })
    }

    #[must_use]
    pub fn config(&self) -> &CotickConfig {
        &self.config
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Rc<Dispatcher> {
        &self.dispatcher
    }

    #[must_use]
    pub fn routines(&self) -> &RoutineHandler {
        &self.routines
    }

    #[must_use]
    pub fn store(&self) -> &KvStore {
        &self.store
    }

    /// Dispatches one line typed by the user.
    ///
    /// # Errors
    ///
    /// The [`CommandError`] already reported through the logger.
    pub fn execute(&mut self, line: &str) -> Result<ProcessId, CommandError> {
        self.dispatcher
            .start_cmd(&mut self.scheduler, line, Trigger::User)
    }

    pub fn tick(&mut self) {
        self.scheduler.tick();
    }

    /// No process is alive.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.scheduler.is_empty()
    }

    /// Ticks until idle (when `idle_exit` is set) or until `max_ticks`
    /// ticks have run, sleeping `tick_interval_ms` between ticks.
    ///
    /// Returns the number of ticks run.
    pub fn run_until_idle(&mut self) -> u64 {
        let settings = self.config.scheduler.clone();
        let interval = Duration::from_millis(settings.tick_interval_ms);
        let mut ticks = 0;
        while ticks < settings.max_ticks {
            if settings.idle_exit && self.is_idle() {
                break;
            }
            self.tick();
            ticks += 1;
            if !interval.is_zero() {
                std::thread::sleep(interval);
            }
        }
        debug!(ticks, idle = self.is_idle(), "tick loop stopped");
        ticks
    }

    /// Writes the save file, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the state cannot be rendered or written.
    pub fn save(&self) -> Result<Option<PathBuf>, HostError> {
        let Some(path) = &self.config.paths.save_file else {
            return Ok(None);
        };
        let text = self.scheduler.save()?;
        std::fs::write(path, text).map_err(|source| HostError::WriteSave {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), "state saved");
        Ok(Some(path.clone()))
    }

    /// Kills every process, then saves.
    ///
    /// # Errors
    ///
    /// Same as [`save`](Self::save).
    pub fn shutdown(&mut self) -> Result<(), HostError> {
        self.scheduler.kill_all();
        self.scheduler.tick();
        self.save()?;
        Ok(())
    }
}

fn load_routines(handler: &RoutineHandler, path: &Path) -> Result<(), HostError> {
    let text = std::fs::read_to_string(path).map_err(|source| HostError::ReadRoutines {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = RoutineParser::parse(&text).map_err(|source| HostError::Routines {
        path: path.to_path_buf(),
        source,
    })?;
    handler
        .add_routines(parsed)
        .map_err(|source| HostError::Routines {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), routines = handler.len(), "routines loaded");
    Ok(())
}

fn read_save_file(path: &Path) -> Result<Option<SaveState>, HostError> {
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(path).map_err(|source| HostError::ReadSave {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(SaveState::from_toml(&text)?))
}
