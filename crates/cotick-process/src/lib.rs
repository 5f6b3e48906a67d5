//! Cooperative process tree driven by an external tick.
//!
//! The host calls [`Scheduler::tick`] on a fixed cadence. Every live
//! process is advanced exactly once per tick, in the order it joined the
//! live set. A process fires its action each time its counter reaches its
//! period, and may spawn children, finish, fail, or kill other processes
//! from inside that action.
//!
//! # Lifecycle
//!
//! ```text
//!   spawn ──► pending ──(next tick)──► active ──fire──► active ...
//!                                        │
//!             done / once fired ─────────┤
//!                                        ▼
//!                               inactive, children alive
//!                                        │ last child finishes
//!                                        ▼
//!   kill / cascade ─────────────────► finished ──► on_done(result) ──► reaped
//! ```
//!
//! Processes live in an arena keyed by [`ProcessId`]. Parent and children
//! are ids, so a cascading kill is an id-based depth-first walk, and a
//! callback receives a [`ProcessContext`] with full mutable access to the
//! scheduler while its own closure is temporarily detached from the arena.
//!
//! # Example
//!
//! ```
//! use cotick_process::{Scheduler, SpawnSpec};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let fired = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&fired);
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.set_smart(false);
//! scheduler.spawn(SpawnSpec::named("blink").with_period(2).with_action(move |_ctx| {
//!     counter.set(counter.get() + 1);
//!     Ok(())
//! }));
//!
//! for _ in 0..4 {
//!     scheduler.tick();
//! }
//! assert_eq!(fired.get(), 2);
//! ```

mod context;
mod error;
mod record;
mod save;
mod scheduler;
mod spawn;

pub use context::ProcessContext;
pub use cotick_types::{Logger, ProcessId, ProcessResult};
pub use error::{ProcessError, SaveError};
pub use save::SaveState;
pub use scheduler::Scheduler;
pub use spawn::{Action, OnDone, SaveHook, SpawnSpec};
