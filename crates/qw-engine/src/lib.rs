//! Incremental pattern matching, selective activation, the reactive
//! scheduler and the public facade over [`qw_store::QuadStore`].
//!
//! [`Engine`] is the crate's single public entry point: everything from
//! `add` through `watch`/`unwatch`/`batch` lives on it, backed by one
//! `Rc<RefCell<_>>` so productions can call back into the store without
//! recursing at the Rust call-stack level (see `scheduler` for how).

mod compiled_pattern;
pub mod config;
pub mod error;
mod handle;
mod match_engine;
mod query;
mod registry;
mod scheduler;
mod watcher;

pub use compiled_pattern::ActivationKey;
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use handle::StoreHandle;
pub use scheduler::Engine;
pub use watcher::{Bindings, PartialMatch, Production, ProductionFailure, QuadInsert, WatcherId};

pub use qw_model::{PatternAtom, PatternQuad, Quad, QuadRef, Slot, Value};
pub use qw_store::StoreStats;
