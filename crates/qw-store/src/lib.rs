//! In-memory quad store with four single-slot permutation indexes.
//!
//! This crate owns storage and lookup only; matching several pattern
//! quads together, watcher bookkeeping and cascade scheduling live in
//! `qw-engine`.

mod index;
pub mod observability;
pub mod error;
mod quad_store;

pub use error::{StoreError, StoreResult};
pub use observability::{OperationType, StoreStats};
pub use quad_store::QuadStore;

pub use qw_model::{equal, hash, ExternalRef, ExternalValue, PatternAtom, PatternQuad, Quad, QuadRef, Slot, Value};
