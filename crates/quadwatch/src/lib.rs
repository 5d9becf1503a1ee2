//! # quadwatch
//!
//! A reactive, in-memory quad store with incremental graph-pattern
//! matching. Data is a set of 4-tuples *(entity, attribute, value,
//! context)*; callers register **watchers** — ordered lists of pattern
//! quads with an optional negative application condition (NAC) and a
//! production callback — then stream quads in with [`Store::add`]. Each
//! watcher fires its production exactly once per distinct binding that
//! satisfies its patterns; a production may insert further quads,
//! forming a cascade that the store drains to completion before `add`
//! returns.
//!
//! Contexts are ordinary values, not a separate namespace: a quad's
//! context can itself be the entity of another quad, so quads can
//! describe quads.
//!
//! ```
//! use quadwatch::{pattern::{var, lit, wildcard, pq}, Store, Bindings, QuadInsert, ProductionFailure, StoreHandle};
//!
//! let store = Store::new();
//! store
//!     .watch()
//!     .pattern(pq(var("p"), lit("age"), var("a"), wildcard()))
//!     .produce(|_bindings: &Bindings, _store: &dyn StoreHandle| -> Result<Vec<QuadInsert>, ProductionFailure> {
//!         Ok(vec![])
//!     })
//!     .unwrap();
//! store.add("alice", "age", 30i64, None).unwrap();
//! ```
//!
//! This crate is the public assembly of three lower-level crates:
//! [`qw_model`] (values, quads, pattern atoms), [`qw_store`] (the
//! indexed store) and [`qw_engine`] (pattern compilation, selective
//! activation, the incremental matcher and the reactive scheduler).
//! Most callers only need `quadwatch` itself; the split exists so each
//! concern can be tested and benchmarked in isolation.
//!
//! This engine is single-threaded by design: a [`Store`] is `Clone` (a
//! cheap handle clone, not a deep copy) but deliberately not `Sync`.
//! Callers wanting multi-core throughput run independent stores.

#![warn(missing_docs)]

pub mod error;
pub mod pattern;
#[cfg(feature = "serde")]
pub mod snapshot;
mod store;
mod watch;

pub use error::{Error, Result};
pub use store::Store;
pub use watch::WatchBuilder;

// Re-exports: the rest of the public vocabulary callers need without
// reaching into the internal crates directly.
pub use qw_engine::{
    ActivationKey, Bindings, EngineConfig, PartialMatch, PatternAtom, PatternQuad, Production, ProductionFailure,
    Quad, QuadInsert, QuadRef, Slot, StoreHandle, Value, WatcherId,
};
pub use qw_store::StoreStats;

/// Convenient glob import for common usage: `use quadwatch::prelude::*;`.
pub mod prelude {
    pub use crate::pattern::{lit, pq, var, wildcard};
    pub use crate::{Bindings, Error, PatternQuad, Quad, Result, Store, StoreHandle, Value, WatcherId};
}
