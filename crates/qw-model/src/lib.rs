//! Value, quad and pattern-atom types shared by the quad store and the
//! watcher engine.
//!
//! This crate carries no behaviour of its own beyond equality, hashing
//! and construction — matching, indexing and scheduling all live
//! upstream in `qw-store` and `qw-engine`.

pub mod pattern;
pub mod quad;
pub mod value;

pub use pattern::{PatternAtom, PatternQuad};
pub use quad::{Quad, QuadRef, Slot};
pub use value::{equal, hash, ExternalRef, ExternalValue, OpaqueId, Value};
