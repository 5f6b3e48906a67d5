//! Text command dispatch on top of the process scheduler.
//!
//! A [`Dispatcher`] owns a registry of named [`Command`]s. Starting a
//! command parses a line of text, checks the caller's [`Trigger`] and
//! the argument count, asks the command's provider for a
//! [`CommandProcess`], and spawns that as a scheduler process (as a
//! root, or as a child of an explicit spawner process).
//!
//! ```text
//! "ar execute mine 4"
//!      │ InputParser::parse
//!      ▼
//! Invocation { name: "ar", args: ["execute", "mine", "4"] }
//!      │ registry lookup ── unknown ──► log + Err(UnknownCommand)
//!      ▼
//! Command "ar" (parent) ──► subcommand "execute"
//!      │ trigger check ─── denied ──► log + Err(PermissionDenied)
//!      │ arity check ───── wrong ───► log + Err(WrongArity)
//!      ▼
//! provider(args, logger) ──► CommandProcess ──► Scheduler::spawn_under
//! ```
//!
//! Built-in commands `help`, `kill` and `ps` are registered by
//! [`Dispatcher::new`].

mod arguments;
mod builtin;
mod command;
mod dispatcher;
mod error;
mod parser;
mod serializer;

pub use arguments::Arguments;
pub use command::{ActionProvider, Command, CommandProcess};
pub use cotick_types::Trigger;
pub use dispatcher::{Dispatcher, SpawnRequest};
pub use error::CommandError;
pub use parser::{InputParser, Invocation};
pub use serializer::CommandSerializer;
