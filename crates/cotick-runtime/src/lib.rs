//! Cotick runtime: configuration and host wiring.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  cotick-cli     : stdin loop, tracing, CLI flags     │
//! └──────────────────────────────────────────────────────┘
//!                          ↓
//! ┌──────────────────────────────────────────────────────┐
//! │  cotick-runtime (THIS CRATE)                         │
//! ├──────────────────────────────────────────────────────┤
//! │  config/  : CotickConfig, ConfigLoader               │
//! │  host     : Host (scheduler + dispatcher + routines) │
//! │  store    : KvStore, persisted through save hooks    │
//! │  commands : echo, set, get, save                     │
//! └──────────────────────────────────────────────────────┘
//!                          ↓
//! ┌──────────────────────────────────────────────────────┐
//! │  cotick-routine → cotick-command → cotick-process    │
//! │                → cotick-types                        │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use cotick_runtime::{config::CotickConfig, Host};
//! use cotick_types::Logger;
//!
//! let mut host = Host::new(CotickConfig::default(), Logger::silent()).unwrap();
//! host.execute("set greeting hello").unwrap();
//! host.tick();
//! assert_eq!(host.store().get("greeting").as_deref(), Some("hello"));
//! assert!(host.is_idle());
//! ```

mod commands;
pub mod config;
mod error;
mod host;
mod store;

pub use error::HostError;
pub use host::Host;
pub use store::KvStore;
