//! Arena entry for a single process.

use crate::spawn::{Action, OnDone};
use cotick_types::{ProcessId, ProcessResult};

pub(crate) struct ProcessRecord {
    pub(crate) id: ProcessId,
    pub(crate) name: String,
    pub(crate) parent: Option<ProcessId>,
    pub(crate) children: Vec<ProcessId>,
    pub(crate) period: u32,
    pub(crate) counter: u32,
    pub(crate) once: bool,
    pub(crate) active: bool,
    pub(crate) result: ProcessResult,
    /// Set while a kill cascade runs through this node.
    pub(crate) terminating: bool,
    /// Set once `on_done` has been claimed; never cleared.
    pub(crate) finished: bool,
    pub(crate) action: Option<Action>,
    pub(crate) on_done: Option<OnDone>,
}

impl ProcessRecord {
    pub(crate) fn new(
        id: ProcessId,
        name: String,
        parent: Option<ProcessId>,
        period: u32,
        once: bool,
        action: Option<Action>,
        on_done: Option<OnDone>,
    ) -> Self {
        Self {
            id,
            name,
            parent,
            children: Vec::new(),
            period: period.max(1),
            counter: 0,
            once,
            active: true,
            result: ProcessResult::Ok,
            terminating: false,
            finished: false,
            action,
            on_done,
        }
    }

    /// Alive while firing, or while waiting on children after `done`.
    pub(crate) fn is_alive(&self) -> bool {
        !self.finished && !self.terminating && (self.active || !self.children.is_empty())
    }
}
