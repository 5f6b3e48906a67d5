//! Routines: small scripts run as trees of scheduler processes.
//!
//! A routine document is parsed by [`RoutineParser`] into named
//! [`AutoRoutine`]s. Executing one never blocks: every instruction
//! spawns processes and reports back through a [`Completion`], so a
//! routine advances as the scheduler ticks.
//!
//! ```text
//! ; comment
//! = Mine            <- starts routine "Mine"
//! while wait $1     <- body below runs until the condition completes
//!   -drill start    <- command, dispatched with Trigger::Cmd
//!   wait 10
//! end
//! -drill recall $2
//! ```
//!
//! | Instruction | Process | Completes when |
//! |-------------|---------|----------------|
//! | `-cmd args` | the command process | the command process finishes |
//! | `wait N` | `ar-wait` (once, period N) | it fires or is killed |
//! | `forever` | `ar-forever` | it is killed |
//! | `while C` ... `end` | `ar-while` | `C` completes or `ar-while` is killed |
//! | routine | `ar-execute <name>` | its last instruction completes |

mod error;
mod handler;
mod instruction;
mod parser;
mod routine;
mod sequence;
mod template;

pub use error::RoutineError;
pub use handler::RoutineHandler;
pub use instruction::{
    CommandInstruction, Completion, ExecEnv, Instruction, WaitInstruction, WhileInstruction,
};
pub use parser::RoutineParser;
pub use routine::AutoRoutine;
pub use sequence::Sequence;
pub use template::Template;
