//! The handle productions and pre-insert interceptors see onto the store.
//!
//! Kept as a trait (rather than exposing [`crate::Engine`] directly) so
//! a production's view of the store is deliberately narrow: read access
//! plus `add`, nothing that could reach into scheduler or registry
//! internals.

use qw_model::{PatternQuad, Value};

use crate::error::EngineResult;
use crate::watcher::Bindings;

/// Read/add access to the store, handed to productions and pre-insert
/// interceptors.
pub trait StoreHandle {
    /// Inserts a quad, auto-assigning a context if `context` is `None`.
    /// Returns the context used and whether the quad was newly inserted.
    fn add(&self, entity: Value, attribute: Value, value: Value, context: Option<Value>) -> EngineResult<(Value, bool)>;

    /// True if an identical quad is already stored.
    fn contains(&self, entity: &Value, attribute: &Value, value: &Value, context: &Value) -> bool;

    /// One-shot multi-pattern join, same semantics as the public `query`.
    fn query(&self, patterns: &[PatternQuad], nac: &[PatternQuad]) -> Vec<Bindings>;
}
