//! The reactive scheduler: work queue, cascade control, and the
//! transactional batch. Also the crate's public facade, since every
//! public operation needs the same interior-mutability seam to let
//! productions call back into `add` without recursing at the Rust
//! call-stack level.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use qw_model::{PatternQuad, Quad, Slot, Value};
use qw_store::QuadStore;

use crate::compiled_pattern::{self, ActivationKey};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::handle::StoreHandle;
use crate::match_engine::feed_quad;
use crate::query::run_query;
use crate::registry::Registry;
use crate::watcher::{Bindings, Production, QuadInsert, Watcher, WatcherId};

/// A unit of deferred work. `ProductionFire` is the load-bearing
/// variant: instead of invoking a production synchronously while
/// extending partial matches, the engine enqueues the call and invokes
/// it only once it is popped, with no `RefCell` borrow outstanding —
/// the production's own calls back into the engine are then just
/// another enqueue, not recursion.
#[derive(Clone)]
enum WorkItem {
    QuadInserted(qw_model::QuadRef),
    WatcherInstalled(WatcherId),
    ProductionFire { watcher_id: WatcherId, bindings: Bindings },
}

/// A pre-insert interceptor: invoked with the candidate quad and a
/// store handle, returns `true` to allow the insert.
type Interceptor = Rc<dyn Fn(&Quad, &dyn StoreHandle) -> bool>;

struct Inner {
    store: QuadStore,
    watchers: AHashMap<WatcherId, Watcher>,
    registry: Registry,
    queue: std::collections::VecDeque<WorkItem>,
    next_watcher_id: u64,
    draining: bool,
    batch_depth: usize,
    cascade_rounds: usize,
    interceptors: Vec<(Value, Interceptor)>,
    config: EngineConfig,
}

impl Inner {
    fn new(config: EngineConfig) -> Self {
        Inner {
            store: QuadStore::new(),
            watchers: AHashMap::default(),
            registry: Registry::default(),
            queue: std::collections::VecDeque::new(),
            next_watcher_id: 0,
            draining: false,
            batch_depth: 0,
            cascade_rounds: 0,
            interceptors: Vec::new(),
            config,
        }
    }
}

/// Snapshot of everything a `batch` must be able to roll back: store
/// contents and auto-context counter, every watcher's partial-match and
/// fired-signature state, the pending queue, and the watcher-id
/// allocator. A full clone rather than a delta log — simpler to reason
/// about at the scale this engine targets, and correct by construction
/// since every field participating in the invariants is covered.
struct Snapshot {
    store: QuadStore,
    watchers: AHashMap<WatcherId, Watcher>,
    queue: std::collections::VecDeque<WorkItem>,
    next_watcher_id: u64,
}

impl Snapshot {
    fn capture(inner: &Inner) -> Self {
        Snapshot {
            store: inner.store.clone(),
            watchers: inner.watchers.clone(),
            queue: inner.queue.clone(),
            next_watcher_id: inner.next_watcher_id,
        }
    }

    /// Restores captured state. The registry is rebuilt from the
    /// restored watchers rather than snapshotted directly — it holds no
    /// state beyond what `watchers` already determines.
    fn restore(self, inner: &mut Inner) {
        inner.store = self.store;
        inner.watchers = self.watchers;
        inner.queue = self.queue;
        inner.next_watcher_id = self.next_watcher_id;
        inner.registry = rebuild_registry(&inner.watchers);
    }
}

fn rebuild_registry(watchers: &AHashMap<WatcherId, Watcher>) -> Registry {
    let mut registry = Registry::default();
    for watcher in watchers.values() {
        registry.insert(watcher.id, &watcher.compiled.activation_key);
    }
    registry
}

/// A reactive quad store: the public facade over the store, watcher
/// registry, match engine and scheduler.
///
/// Cloning an `Engine` clones the handle, not the data — both handles
/// still refer to the same store. This engine is single-threaded by
/// design (`Rc`/`RefCell` throughout), so the shared handle is `Rc`,
/// not `Arc`, and the type is deliberately `!Sync`.
#[derive(Clone)]
pub struct Engine(Rc<RefCell<Inner>>);

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    /// Creates an empty store with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Engine(Rc::new(RefCell::new(Inner::new(config))))
    }

    /// Inserts a quad, assigning an `edge:N` context if `context` is
    /// `None`. Returns the context used and whether the quad was newly
    /// inserted (a blocked or deduplicated insert returns `is_new =
    /// false`).
    pub fn add(&self, entity: Value, attribute: Value, value: Value, context: Option<Value>) -> EngineResult<(Value, bool)> {
        let _span = tracing::debug_span!("engine.add").entered();

        let resolved_context = {
            let inner = self.0.borrow();
            context.unwrap_or_else(|| inner.store.next_auto_context())
        };
        let candidate = Quad::new(entity.clone(), attribute.clone(), value.clone(), resolved_context.clone(), 0);

        let handlers = {
            let inner = self.0.borrow();
            gather_interceptors(&inner.interceptors, &candidate)
        };
        let mut allow = true;
        for handler in &handlers {
            if !handler(&candidate, self) {
                allow = false;
            }
        }
        if !allow {
            tracing::debug!("quad blocked by pre-insert interceptor");
            return Ok((resolved_context, false));
        }

        let (quad_ref, is_new) = {
            let mut inner = self.0.borrow_mut();
            inner.store.add(entity, attribute, value, resolved_context.clone())?
        };

        if is_new {
            let mut inner = self.0.borrow_mut();
            inner.queue.push_back(WorkItem::QuadInserted(quad_ref));
        }

        self.drain_if_top_level()?;
        Ok((resolved_context, is_new))
    }

    /// Removes a quad. Does not retract partial matches or fired
    /// productions — the engine is monotonic with respect to
    /// already-fired productions, per design.
    pub fn remove(&self, entity: &Value, attribute: &Value, value: &Value, context: &Value) -> bool {
        let _span = tracing::debug_span!("engine.remove").entered();
        self.0.borrow_mut().store.remove(entity, attribute, value, context)
    }

    /// True if an identical quad is stored.
    pub fn contains(&self, entity: &Value, attribute: &Value, value: &Value, context: &Value) -> bool {
        self.0.borrow().store.contains(entity, attribute, value, context)
    }

    /// One-shot multi-pattern join.
    pub fn query(&self, patterns: &[PatternQuad], nac: &[PatternQuad]) -> Vec<Bindings> {
        let inner = self.0.borrow();
        run_query(&inner.store, patterns, nac)
    }

    /// Registers a watcher and scans the current store for matches it
    /// would already have fired had it been installed before the data
    /// arrived — the order-independence guarantee.
    pub fn watch<P>(&self, positive: Vec<PatternQuad>, nac: Vec<PatternQuad>, production: P) -> EngineResult<WatcherId>
    where
        P: Production + 'static,
    {
        let _span = tracing::debug_span!("engine.watch").entered();
        let compiled = compiled_pattern::compile(positive, nac)?;
        if self.0.borrow().config.trace_pattern_compilation {
            tracing::debug!(activation_key = ?compiled.activation_key, "compiled watcher pattern");
        }

        let id = {
            let mut inner = self.0.borrow_mut();
            let id = WatcherId(inner.next_watcher_id);
            inner.next_watcher_id += 1;
            inner.registry.insert(id, &compiled.activation_key);
            inner.watchers.insert(
                id,
                Watcher {
                    id,
                    compiled,
                    production: Rc::new(production),
                    partial_matches: Vec::new(),
                    fired_signatures: ahash::AHashSet::default(),
                },
            );
            inner.queue.push_back(WorkItem::WatcherInstalled(id));
            id
        };

        self.drain_if_top_level()?;
        Ok(id)
    }

    /// Removes a watcher. Idempotent: unwatching an already-gone or
    /// never-registered id is not an error, just a no-op reported via
    /// the boolean return.
    pub fn unwatch(&self, id: WatcherId) -> bool {
        let mut inner = self.0.borrow_mut();
        match inner.watchers.remove(&id) {
            Some(watcher) => {
                inner.registry.remove(id, &watcher.compiled.activation_key);
                true
            }
            None => false,
        }
    }

    /// Runs `body` as a transaction: on success its effects (and the
    /// matcher cascade they trigger) commit together; on error every
    /// quad, index, partial match and fired-signature added during the
    /// batch is rolled back and the error is returned. Batches nest.
    pub fn batch<T>(&self, body: impl FnOnce(&Engine) -> EngineResult<T>) -> EngineResult<T> {
        let _span = tracing::debug_span!("engine.batch").entered();
        let snapshot = {
            let mut inner = self.0.borrow_mut();
            inner.batch_depth += 1;
            Snapshot::capture(&inner)
        };

        let result = body(self);

        let mut inner = self.0.borrow_mut();
        inner.batch_depth -= 1;
        match result {
            Ok(value) => {
                let depth = inner.batch_depth;
                drop(inner);
                if depth == 0 {
                    if let Err(err) = self.drain() {
                        tracing::debug!(error = %err, "batch rolled back after commit-time drain failure");
                        let mut inner = self.0.borrow_mut();
                        snapshot.restore(&mut inner);
                        return Err(err);
                    }
                }
                Ok(value)
            }
            Err(err) => {
                tracing::debug!(error = %err, "batch rolled back");
                snapshot.restore(&mut inner);
                Err(err)
            }
        }
    }

    /// Every distinct context value ever assigned to a stored quad.
    pub fn list_contexts(&self) -> Vec<Value> {
        self.0.borrow().store.distinct_values(Slot::Context)
    }

    /// Quads carrying `context` in their context slot, in insertion order.
    pub fn get_by_context(&self, context: &Value) -> Vec<qw_model::QuadRef> {
        self.0.borrow().store.get_by_slot(Slot::Context, context)
    }

    /// Number of quads currently stored.
    pub fn size(&self) -> usize {
        self.0.borrow().store.len()
    }

    /// All stored quads, in insertion order.
    pub fn edges(&self) -> Vec<qw_model::QuadRef> {
        self.0.borrow().store.all()
    }

    /// Registers a pre-insert interceptor keyed by a value: the handler
    /// runs on every quad carrying `key` in any slot, before the quad is
    /// committed. Every registered handler runs even once one has
    /// already returned `block`.
    pub fn register_interceptor<F>(&self, key: Value, handler: F)
    where
        F: Fn(&Quad, &dyn StoreHandle) -> bool + 'static,
    {
        self.0.borrow_mut().interceptors.push((key, Rc::new(handler)));
    }

    fn drain_if_top_level(&self) -> EngineResult<()> {
        let should_drain = {
            let inner = self.0.borrow();
            !inner.draining && inner.batch_depth == 0
        };
        if should_drain {
            self.drain()?;
        }
        Ok(())
    }

    fn drain(&self) -> EngineResult<()> {
        {
            let mut inner = self.0.borrow_mut();
            inner.draining = true;
            inner.cascade_rounds = 0;
        }
        let result = self.drain_loop();
        self.0.borrow_mut().draining = false;
        result
    }

    fn drain_loop(&self) -> EngineResult<()> {
        loop {
            let item = {
                let mut inner = self.0.borrow_mut();
                inner.cascade_rounds += 1;
                if inner.cascade_rounds > inner.config.max_cascade_depth {
                    let max_depth = inner.config.max_cascade_depth;
                    return Err(EngineError::CascadeLimitExceeded { max_depth });
                }
                inner.queue.pop_front()
            };
            let Some(item) = item else { break };
            self.process_item(item)?;
        }
        Ok(())
    }

    fn process_item(&self, item: WorkItem) -> EngineResult<()> {
        match item {
            WorkItem::QuadInserted(quad) => self.process_quad_inserted(&quad),
            WorkItem::WatcherInstalled(id) => self.process_watcher_installed(id),
            WorkItem::ProductionFire { watcher_id, bindings } => self.process_production_fire(watcher_id, bindings),
        }
    }

    fn process_quad_inserted(&self, quad: &Quad) -> EngineResult<()> {
        let mut inner = self.0.borrow_mut();
        let candidates = inner.registry.candidates(quad);
        let mut fires = Vec::new();
        for watcher_id in candidates {
            if let Some(watcher) = inner.watchers.get_mut(&watcher_id) {
                let bindings = feed_quad(&inner.store, watcher, quad);
                for b in bindings {
                    fires.push((watcher_id, b));
                }
            }
        }
        for (watcher_id, bindings) in fires {
            inner.queue.push_back(WorkItem::ProductionFire { watcher_id, bindings });
        }
        Ok(())
    }

    fn process_watcher_installed(&self, id: WatcherId) -> EngineResult<()> {
        let mut inner = self.0.borrow_mut();
        if !inner.watchers.contains_key(&id) {
            return Ok(());
        }
        let candidates = initial_scan_candidates(&inner.store, &inner.watchers[&id]);
        let mut fires = Vec::new();
        for quad in candidates {
            if let Some(watcher) = inner.watchers.get_mut(&id) {
                let bindings = feed_quad(&inner.store, watcher, &quad);
                for b in bindings {
                    fires.push((id, b));
                }
            }
        }
        for (watcher_id, bindings) in fires {
            inner.queue.push_back(WorkItem::ProductionFire { watcher_id, bindings });
        }
        Ok(())
    }

    fn process_production_fire(&self, watcher_id: WatcherId, bindings: Bindings) -> EngineResult<()> {
        let production = {
            let inner = self.0.borrow();
            inner.watchers.get(&watcher_id).map(|w| w.production.clone())
        };
        let Some(production) = production else {
            tracing::trace!(watcher = watcher_id.0, "production fired for an unwatched watcher, skipped");
            return Ok(());
        };

        match production.call(&bindings, self) {
            Ok(inserts) => {
                for (entity, attribute, value, context) in inserts {
                    self.add(entity, attribute, value, context)?;
                }
                Ok(())
            }
            Err(err) => Err(EngineError::ProductionError(err)),
        }
    }
}

impl StoreHandle for Engine {
    fn add(&self, entity: Value, attribute: Value, value: Value, context: Option<Value>) -> EngineResult<(Value, bool)> {
        Engine::add(self, entity, attribute, value, context)
    }

    fn contains(&self, entity: &Value, attribute: &Value, value: &Value, context: &Value) -> bool {
        Engine::contains(self, entity, attribute, value, context)
    }

    fn query(&self, patterns: &[PatternQuad], nac: &[PatternQuad]) -> Vec<Bindings> {
        Engine::query(self, patterns, nac)
    }
}

fn gather_interceptors(interceptors: &[(Value, Interceptor)], quad: &Quad) -> Vec<Interceptor> {
    interceptors
        .iter()
        .filter(|(key, _)| Slot::ALL.iter().any(|slot| quad.get(*slot) == key))
        .map(|(_, handler)| handler.clone())
        .collect()
}

/// Gathers the candidate quads for a watcher's initial scan: the union
/// of each pattern-quad's most selective index bucket (falling back to
/// a full store scan for an all-variable pattern), deduplicated and
/// sorted by true insertion order so replay matches the order the data
/// would have arrived in had the watcher existed all along.
fn initial_scan_candidates(store: &QuadStore, watcher: &Watcher) -> Vec<qw_model::QuadRef> {
    let mut seen = ahash::AHashSet::default();
    let mut out = Vec::new();
    for pattern in &watcher.compiled.positive {
        let bucket = match leftmost_literal(pattern) {
            Some((slot, value)) => store.get_by_slot(slot, &value),
            None => store.all(),
        };
        for quad in bucket {
            if seen.insert(quad.content_hash()) {
                out.push(quad);
            }
        }
    }
    out.sort_by_key(|q| q.seq());
    out
}

fn leftmost_literal(pattern: &PatternQuad) -> Option<(Slot, Value)> {
    for slot in Slot::ALL {
        if let qw_model::PatternAtom::Constant(v) = pattern.get(slot) {
            return Some((slot, v.clone()));
        }
    }
    None
}
