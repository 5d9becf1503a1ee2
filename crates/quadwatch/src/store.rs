//! [`Store`]: the crate's public facade, wrapping [`qw_engine::Engine`]
//! behind `quadwatch`'s own error type and a couple of builder entry
//! points.

use qw_engine::{
    Bindings, Engine, EngineConfig, PatternQuad, Production, QuadRef, StoreHandle, Value, WatcherId,
};

use crate::error::Result;
use crate::watch::WatchBuilder;

/// A reactive, in-memory quad store with incremental watcher matching.
///
/// Cloning a `Store` clones a handle, not the data: every clone shares
/// the same underlying engine, the way `Rc` clones share their
/// allocation. The type is single-threaded by design (see the crate's
/// design notes) and deliberately not `Sync`.
#[derive(Clone, Default)]
pub struct Store {
    engine: Engine,
}

impl Store {
    /// Creates an empty store with default configuration.
    pub fn new() -> Self {
        Store { engine: Engine::default() }
    }

    /// Creates an empty store with explicit tunables (cascade depth
    /// limit, pattern-compilation tracing).
    pub fn with_config(config: EngineConfig) -> Self {
        Store { engine: Engine::new(config) }
    }

    pub(crate) fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Inserts `(entity, attribute, value, context)`. When `context` is
    /// `None` the store assigns the next `edge:N` auto-context.
    /// Returns the context actually used and whether the quad was newly
    /// inserted (`false` covers both an exact duplicate and a quad a
    /// pre-insert interceptor blocked).
    pub fn add(
        &self,
        entity: impl Into<Value>,
        attribute: impl Into<Value>,
        value: impl Into<Value>,
        context: Option<Value>,
    ) -> Result<(Value, bool)> {
        Ok(self.engine.add(entity.into(), attribute.into(), value.into(), context)?)
    }

    /// Removes a quad exactly matching the given slots. Does not
    /// retract partial matches or already-fired productions.
    pub fn remove(&self, entity: &Value, attribute: &Value, value: &Value, context: &Value) -> bool {
        self.engine.remove(entity, attribute, value, context)
    }

    /// True if an identical quad is stored.
    pub fn contains(&self, entity: &Value, attribute: &Value, value: &Value, context: &Value) -> bool {
        self.engine.contains(entity, attribute, value, context)
    }

    /// One-shot multi-pattern join, optionally filtered by NAC
    /// sub-patterns, deduplicated by canonical binding signature.
    pub fn query(&self, patterns: &[PatternQuad], nac: &[PatternQuad]) -> Vec<Bindings> {
        self.engine.query(patterns, nac)
    }

    /// Starts building a watcher: chain [`WatchBuilder::pattern`] and
    /// [`WatchBuilder::nac`] calls, then finish with
    /// [`WatchBuilder::produce`].
    pub fn watch(&self) -> WatchBuilder<'_> {
        WatchBuilder::new(self)
    }

    /// Registers a watcher directly from already-built pattern lists,
    /// for callers that assembled them without the builder.
    pub fn watch_with<P>(&self, positive: Vec<PatternQuad>, nac: Vec<PatternQuad>, production: P) -> Result<WatcherId>
    where
        P: Production + 'static,
    {
        Ok(self.engine.watch(positive, nac, production)?)
    }

    /// Removes a watcher. Idempotent: unwatching a stale or unknown id
    /// is a benign no-op reported via the boolean return, never an error.
    pub fn unwatch(&self, id: WatcherId) -> bool {
        self.engine.unwatch(id)
    }

    /// Runs `body` as a transaction: on success its effects (and the
    /// cascade they trigger) commit together; on error the store,
    /// indexes, auto-context counter and every watcher's partial-match
    /// and fired-signature state roll back to the pre-batch snapshot.
    pub fn batch<T>(&self, body: impl FnOnce(&Store) -> Result<T>) -> Result<T> {
        Ok(self.engine.batch(|_engine| body(self).map_err(|e| match e {
            crate::error::Error::Engine(inner) => inner,
        }))?)
    }

    /// Every distinct context value ever assigned to a stored quad.
    pub fn list_contexts(&self) -> Vec<Value> {
        self.engine.list_contexts()
    }

    /// Quads carrying `context` in their context slot, in insertion order.
    pub fn get_by_context(&self, context: &Value) -> Vec<QuadRef> {
        self.engine.get_by_context(context)
    }

    /// Number of quads currently stored.
    pub fn size(&self) -> usize {
        self.engine.size()
    }

    /// All stored quads, in insertion order.
    pub fn edges(&self) -> Vec<QuadRef> {
        self.engine.edges()
    }

    /// Registers a pre-insert interceptor keyed by a value appearing in
    /// any slot of a candidate quad. Every registered handler runs even
    /// once one has already returned `block`; if any handler blocks,
    /// the quad is not inserted and `add` reports `is_new = false`.
    pub fn register_interceptor<F>(&self, key: Value, handler: F)
    where
        F: Fn(&qw_engine::Quad, &dyn StoreHandle) -> bool + 'static,
    {
        self.engine.register_interceptor(key, handler);
    }
}
