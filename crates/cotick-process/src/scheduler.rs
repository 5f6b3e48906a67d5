//! Process arena and tick loop.
//!
//! # Tick
//!
//! ```text
//! tick()
//!   ├─ merge pending processes into the live set (smart counter spreading)
//!   ├─ advance every live process once, in insertion order
//!   └─ reap processes that stopped being alive
//! ```
//!
//! Processes spawned while a tick runs land in `pending` and first fire
//! on the following tick.
//!
//! # Failure containment
//!
//! An action or completion callback that returns `Err` or panics is
//! logged and swallowed at that node. Siblings keep ticking and kill
//! cascades keep walking.

use crate::record::ProcessRecord;
use crate::spawn::SaveHook;
use crate::{
    Logger, ProcessContext, ProcessError, ProcessId, ProcessResult, SaveError, SaveState, SpawnSpec,
};
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// Name given to root processes spawned without one.
const ANONYMOUS: &str = "<anonymous>";

/// Owns every process and advances them once per tick.
pub struct Scheduler {
    records: HashMap<ProcessId, ProcessRecord>,
    /// Ticked every pass, in insertion order.
    live: Vec<ProcessId>,
    /// Spawned since the last merge.
    pending: Vec<ProcessId>,
    next_id: u64,
    smart: bool,
    ticks: u64,
    logger: Logger,
    save_hooks: Vec<SaveHook>,
}

impl Scheduler {
    /// Creates an empty scheduler with smart counter spreading enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            live: Vec::new(),
            pending: Vec::new(),
            next_id: 1,
            smart: true,
            ticks: 0,
            logger: Logger::silent(),
            save_hooks: Vec::new(),
        }
    }

    /// Sends diagnostics and listings to `logger`.
    #[must_use]
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    #[must_use]
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Enables or disables counter spreading for newly merged processes.
    pub fn set_smart(&mut self, smart: bool) {
        self.smart = smart;
    }

    #[must_use]
    pub fn is_smart(&self) -> bool {
        self.smart
    }

    /// Number of completed [`tick`](Self::tick) calls.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    /// Spawns a root process. It joins the live set on the next tick.
    pub fn spawn(&mut self, spec: SpawnSpec) -> ProcessId {
        self.insert(None, spec)
    }

    /// Spawns a process as a child of `parent`.
    ///
    /// # Errors
    ///
    /// - [`ProcessError::NotFound`] if `parent` does not exist.
    /// - [`ProcessError::NotAlive`] if `parent` finished or is being killed.
    pub fn spawn_child(
        &mut self,
        parent: ProcessId,
        spec: SpawnSpec,
    ) -> Result<ProcessId, ProcessError> {
        match self.records.get(&parent) {
            None => Err(ProcessError::NotFound(parent)),
            Some(record) if !record.is_alive() => Err(ProcessError::NotAlive(parent)),
            Some(_) => Ok(self.insert(Some(parent), spec)),
        }
    }

    /// Spawns under `parent` when given, otherwise as a root.
    ///
    /// # Errors
    ///
    /// Same as [`spawn_child`](Self::spawn_child).
    pub fn spawn_under(
        &mut self,
        parent: Option<ProcessId>,
        spec: SpawnSpec,
    ) -> Result<ProcessId, ProcessError> {
        match parent {
            Some(parent) => self.spawn_child(parent, spec),
            None => Ok(self.spawn(spec)),
        }
    }

    fn insert(&mut self, parent: Option<ProcessId>, spec: SpawnSpec) -> ProcessId {
        let id = ProcessId::new(self.next_id);
        self.next_id += 1;

        let name = match (spec.name, parent) {
            (Some(name), _) => name,
            (None, Some(parent)) => format!("{}-child", self.name(parent).unwrap_or(ANONYMOUS)),
            (None, None) => ANONYMOUS.to_string(),
        };

        if let Some(parent) = parent {
            if let Some(record) = self.records.get_mut(&parent) {
                record.children.push(id);
            }
        }

        debug!(pid = %id, name = %name, period = spec.period, once = spec.once, "process spawned");

        let record = ProcessRecord::new(
            id,
            name,
            parent,
            spec.period,
            spec.once,
            spec.action,
            spec.on_done,
        );
        self.records.insert(id, record);
        self.pending.push(id);
        id
    }

    // ------------------------------------------------------------------
    // Ticking
    // ------------------------------------------------------------------

    /// Advances every live process once.
    pub fn tick(&mut self) {
        self.merge_pending();

        for index in 0..self.live.len() {
            let pid = self.live[index];
            self.advance(pid);
        }

        self.reap();
        self.ticks += 1;
    }

    fn merge_pending(&mut self) {
        let incoming = std::mem::take(&mut self.pending);
        for pid in incoming {
            let Some(record) = self.records.get(&pid) else {
                continue;
            };
            if !record.is_alive() {
                self.records.remove(&pid);
                continue;
            }
            if self.smart && record.period > 1 && !record.once {
                let slot = self.free_slot(record.period);
                self.reset_counter(pid, slot);
            }
            self.live.push(pid);
        }
    }

    /// First counter value in `[0, period)` no live same-period process uses.
    fn free_slot(&self, period: u32) -> u32 {
        let used: HashSet<u32> = self
            .live
            .iter()
            .filter_map(|pid| self.records.get(pid))
            .filter(|record| record.period == period)
            .map(|record| record.counter)
            .collect();
        (0..period).find(|slot| !used.contains(slot)).unwrap_or(0)
    }

    fn advance(&mut self, pid: ProcessId) {
        let Some(record) = self.records.get_mut(&pid) else {
            return;
        };
        if !record.active {
            return;
        }
        record.counter += 1;
        if record.counter < record.period {
            return;
        }

        let once = record.once;
        if let Some(mut action) = record.action.take() {
            self.guarded(pid, "action", |ctx| action(ctx));
            if let Some(record) = self.records.get_mut(&pid) {
                if record.active && record.action.is_none() {
                    record.action = Some(action);
                }
            }
        }

        if let Some(record) = self.records.get_mut(&pid) {
            if record.active {
                record.counter = 0;
            }
        }
        if once {
            self.done(pid);
        }
    }

    fn reap(&mut self) {
        let records = &mut self.records;
        self.live.retain(|pid| {
            let alive = records.get(pid).is_some_and(ProcessRecord::is_alive);
            if !alive {
                records.remove(pid);
            }
            alive
        });
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Finishes a process normally.
    ///
    /// Only an active process can be finished. If it still has living
    /// children it stops firing at once, and its `on_done` runs when the
    /// last child finishes.
    pub fn done(&mut self, pid: ProcessId) {
        let Some(record) = self.records.get_mut(&pid) else {
            return;
        };
        if !record.active {
            return;
        }
        record.active = false;
        if record.children.is_empty() {
            self.finish(pid, true);
        }
    }

    /// Finishes a process with result [`ProcessResult::Failed`].
    ///
    /// Has no effect once the process is dead or already carries a
    /// non-OK result.
    pub fn fail(&mut self, pid: ProcessId) {
        let Some(record) = self.records.get_mut(&pid) else {
            return;
        };
        if !record.is_alive() || record.result != ProcessResult::Ok {
            return;
        }
        record.result = ProcessResult::Failed;
        self.done(pid);
    }

    /// Kills a process and all its descendants.
    ///
    /// Descendants finish deepest first, each `on_done` receiving
    /// [`ProcessResult::Killed`]; the parent of `pid` is then notified.
    pub fn kill(&mut self, pid: ProcessId) {
        let parent = match self.records.get(&pid) {
            Some(record) if record.is_alive() => record.parent,
            _ => return,
        };
        debug!(pid = %pid, "killing process");
        self.kill_subtree(pid);
        if let Some(parent) = parent {
            self.child_finished(parent, pid);
        }
    }

    /// Kills the children of `pid`, leaving `pid` itself running.
    pub fn kill_children(&mut self, pid: ProcessId) {
        let children = match self.records.get(&pid) {
            Some(record) => record.children.clone(),
            None => return,
        };
        for child in children {
            self.kill(child);
        }
    }

    /// Kills every process that exists when the call starts.
    ///
    /// Processes spawned by completion callbacks during the call survive.
    pub fn kill_all(&mut self) {
        for pid in self.snapshot(|_| true) {
            self.kill(pid);
        }
    }

    /// Kills every process named `name` that exists when the call starts.
    ///
    /// Processes spawned by completion callbacks during the call survive,
    /// even if they carry the same name.
    pub fn kill_all_named(&mut self, name: &str) {
        for pid in self.snapshot(|record| record.name == name) {
            self.kill(pid);
        }
    }

    /// Moves the counter of an active process to `value`, clamped into
    /// `[0, period - 1]`.
    pub fn reset_counter(&mut self, pid: ProcessId, value: u32) {
        if let Some(record) = self.records.get_mut(&pid) {
            if record.active {
                record.counter = value.min(record.period - 1);
            }
        }
    }

    fn kill_subtree(&mut self, pid: ProcessId) {
        let children = match self.records.get_mut(&pid) {
            Some(record) if record.is_alive() => {
                record.terminating = true;
                record.active = false;
                record.result = ProcessResult::Killed;
                std::mem::take(&mut record.children)
            }
            _ => return,
        };
        for child in children {
            self.kill_subtree(child);
        }
        self.finish(pid, false);
    }

    /// Claims and runs `on_done` exactly once.
    fn finish(&mut self, pid: ProcessId, notify_parent: bool) {
        let (on_done, result, parent) = match self.records.get_mut(&pid) {
            Some(record) if !record.finished => {
                record.finished = true;
                record.active = false;
                record.action = None;
                (record.on_done.take(), record.result, record.parent)
            }
            _ => return,
        };

        debug!(pid = %pid, result = %result, "process finished");
        if let Some(on_done) = on_done {
            self.guarded(pid, "on_done", |ctx| on_done(ctx, result));
        }

        if notify_parent {
            if let Some(parent) = parent {
                self.child_finished(parent, pid);
            }
        }
    }

    fn child_finished(&mut self, parent: ProcessId, child: ProcessId) {
        let ready = match self.records.get_mut(&parent) {
            Some(record) => {
                record.children.retain(|id| *id != child);
                !record.active
                    && !record.finished
                    && !record.terminating
                    && record.children.is_empty()
            }
            None => false,
        };
        if ready {
            self.finish(parent, true);
        }
    }

    /// Runs a callback for `pid`, containing errors and panics.
    fn guarded<F>(&mut self, pid: ProcessId, stage: &'static str, callback: F)
    where
        F: FnOnce(&mut ProcessContext<'_>) -> Result<(), ProcessError>,
    {
        let outcome = {
            let mut ctx = ProcessContext::new(self, pid);
            panic::catch_unwind(AssertUnwindSafe(|| callback(&mut ctx)))
        };
        let error = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };

        let name = self.name(pid).unwrap_or(ANONYMOUS).to_string();
        warn!(pid = %pid, name = %name, stage, error = %error, "process callback failed");
        self.logger
            .log(format!("Error in {stage} of process {pid} '{name}': {error}"));
    }

    fn snapshot(&self, filter: impl Fn(&ProcessRecord) -> bool) -> Vec<ProcessId> {
        self.live
            .iter()
            .chain(&self.pending)
            .filter(|pid| self.records.get(*pid).is_some_and(&filter))
            .copied()
            .collect()
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    #[must_use]
    pub fn contains(&self, pid: ProcessId) -> bool {
        self.records.contains_key(&pid)
    }

    #[must_use]
    pub fn is_alive(&self, pid: ProcessId) -> bool {
        self.records.get(&pid).is_some_and(ProcessRecord::is_alive)
    }

    #[must_use]
    pub fn is_active(&self, pid: ProcessId) -> bool {
        self.records.get(&pid).is_some_and(|record| record.active)
    }

    #[must_use]
    pub fn name(&self, pid: ProcessId) -> Option<&str> {
        self.records.get(&pid).map(|record| record.name.as_str())
    }

    #[must_use]
    pub fn counter(&self, pid: ProcessId) -> Option<u32> {
        self.records.get(&pid).map(|record| record.counter)
    }

    #[must_use]
    pub fn period(&self, pid: ProcessId) -> Option<u32> {
        self.records.get(&pid).map(|record| record.period)
    }

    #[must_use]
    pub fn result(&self, pid: ProcessId) -> Option<ProcessResult> {
        self.records.get(&pid).map(|record| record.result)
    }

    #[must_use]
    pub fn parent(&self, pid: ProcessId) -> Option<ProcessId> {
        self.records.get(&pid).and_then(|record| record.parent)
    }

    #[must_use]
    pub fn children(&self, pid: ProcessId) -> Vec<ProcessId> {
        self.records
            .get(&pid)
            .map(|record| record.children.clone())
            .unwrap_or_default()
    }

    /// Alive processes, live set first, then not yet merged ones.
    #[must_use]
    pub fn process_ids(&self) -> Vec<ProcessId> {
        self.snapshot(ProcessRecord::is_alive)
    }

    /// Alive processes with the given name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Vec<ProcessId> {
        self.snapshot(|record| record.is_alive() && record.name == name)
    }

    /// Number of alive processes, pending ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.process_ids().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders the alive tree, one `"{id}: {name}"` line per process,
    /// indented two spaces per level.
    #[must_use]
    pub fn log(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for pid in self.snapshot(|record| record.parent.is_none() && record.is_alive()) {
            self.describe(pid, 0, &mut lines);
        }
        lines
    }

    /// Writes [`log`](Self::log) to `logger`, line by line.
    pub fn log_to(&self, logger: &Logger) {
        for line in self.log() {
            logger.log(line);
        }
    }

    fn describe(&self, pid: ProcessId, depth: usize, lines: &mut Vec<String>) {
        let Some(record) = self.records.get(&pid) else {
            return;
        };
        lines.push(format!(
            "{:indent$}{}: {}",
            "",
            record.id,
            record.name,
            indent = depth * 2
        ));
        for child in &record.children {
            self.describe(*child, depth + 1, lines);
        }
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Registers a callback contributing to [`save`](Self::save).
    pub fn add_on_save(&mut self, hook: impl Fn(&mut SaveState) + 'static) {
        self.save_hooks.push(Box::new(hook));
    }

    /// Runs every save hook, in registration order, into one state.
    #[must_use]
    pub fn collect_save_state(&self) -> SaveState {
        let mut state = SaveState::new();
        for hook in &self.save_hooks {
            hook(&mut state);
        }
        state
    }

    /// Runs every save hook and renders the result as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError`] if rendering fails.
    pub fn save(&self) -> Result<String, SaveError> {
        self.collect_save_state().to_toml()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("live", &self.live.len())
            .field("pending", &self.pending.len())
            .field("smart", &self.smart)
            .field("ticks", &self.ticks)
            .field("save_hooks", &self.save_hooks.len())
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}
