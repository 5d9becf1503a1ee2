//! The quad store: insertion, removal, containment and pattern lookup.

use std::cell::Cell;

use ahash::AHashSet;
use qw_model::{PatternQuad, Quad, QuadRef, Slot, Value};

use crate::error::{StoreError, StoreResult};
use crate::index::IndexSet;
use crate::observability::{track_operation, OperationType, StoreStats};

/// In-memory store of quads, indexed by all four slots.
///
/// Dedup is by quad identity (equal entity/attribute/value/context,
/// `seq` ignored): inserting a quad already present is a no-op that
/// returns the existing [`QuadRef`] rather than creating a duplicate.
///
/// `Clone` is a deep copy of all quads and indexes; the engine's batch
/// rollback uses it to snapshot store state cheaply (quads themselves
/// are `Rc`-shared, so cloning is just pointer-copying plus small map
/// restructuring, not a re-hash of every value).
#[derive(Clone)]
pub struct QuadStore {
    quads: AHashSet<QuadRef>,
    indexes: IndexSet,
    next_seq: Cell<u64>,
    next_context: Cell<u64>,
    stats: StoreStats,
}

impl Default for QuadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        QuadStore {
            quads: AHashSet::default(),
            indexes: IndexSet::default(),
            next_seq: Cell::new(0),
            next_context: Cell::new(0),
            stats: StoreStats::default(),
        }
    }

    /// Generates the next `edge:N` auto-context value, for callers that
    /// add a quad without naming a context explicitly.
    pub fn next_auto_context(&self) -> Value {
        let n = self.next_context.get();
        self.next_context.set(n + 1);
        Value::string(format!("edge:{n}"))
    }

    /// Number of distinct quads currently stored.
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    /// True if the store holds no quads.
    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Read-only diagnostic counters.
    pub fn stats(&self) -> &StoreStats {
        &self.stats
    }

    /// Adds a quad, assigning it the next insertion sequence number.
    ///
    /// Returns the stored [`QuadRef`] together with whether it was
    /// newly inserted — `false` means an identical quad was already
    /// present and the existing one was returned instead. Rejects
    /// quads carrying a NaN-free but otherwise degenerate shape via
    /// [`validate`](Self::validate).
    pub fn add(&mut self, entity: Value, attribute: Value, value: Value, context: Value) -> StoreResult<(QuadRef, bool)> {
        Self::validate(&entity, &attribute, &value, &context)?;
        let seq = self.next_seq.get();
        let candidate = Quad::new(entity, attribute, value, context, seq);

        track_operation(OperationType::Add, || {
            if let Some(existing) = self.quads.get(&candidate) {
                self.stats.record_add(true);
                return Ok((existing.clone(), false));
            }
            self.next_seq.set(seq + 1);
            let stored: QuadRef = std::rc::Rc::new(candidate);
            self.indexes.insert(&stored);
            self.quads.insert(stored.clone());
            self.stats.record_add(false);
            Ok((stored, true))
        })
    }

    /// Validates slot shape before insertion. Currently this is a
    /// no-op seam: [`Value`] construction already rejects NaN, so no
    /// slot combination is structurally invalid today, but the check
    /// keeps `add` fallible for future constraints (e.g. forbidding
    /// `Value::Null` in the entity slot) without a signature change.
    fn validate(_entity: &Value, _attribute: &Value, _value: &Value, _context: &Value) -> StoreResult<()> {
        Ok(())
    }

    /// Removes a quad exactly matching the given slots, regardless of
    /// its insertion sequence. Returns whether a quad was removed.
    pub fn remove(&mut self, entity: &Value, attribute: &Value, value: &Value, context: &Value) -> bool {
        let probe = Quad::new(entity.clone(), attribute.clone(), value.clone(), context.clone(), 0);
        track_operation(OperationType::Remove, || {
            let removed = self.quads.take(&probe);
            if let Some(quad) = &removed {
                self.indexes.remove(quad);
            }
            self.stats.record_remove(removed.is_some());
            removed.is_some()
        })
    }

    /// True if an identical quad is stored, ignoring insertion sequence.
    pub fn contains(&self, entity: &Value, attribute: &Value, value: &Value, context: &Value) -> bool {
        let probe = Quad::new(entity.clone(), attribute.clone(), value.clone(), context.clone(), 0);
        track_operation(OperationType::Contains, || self.quads.contains(&probe))
    }

    /// All quads currently stored, in insertion order.
    pub fn all(&self) -> Vec<QuadRef> {
        let mut all: Vec<QuadRef> = self.quads.iter().cloned().collect();
        all.sort_by_key(|q| q.seq());
        all
    }

    /// Quads matching `pattern`, in insertion order. Picks the most
    /// selective bound slot to scan via the indexes, then filters the
    /// candidate bucket against the full pattern.
    pub fn find(&self, pattern: &PatternQuad) -> Vec<QuadRef> {
        track_operation(OperationType::Find, || {
            let mut candidates = match self.most_selective_slot(pattern) {
                Some((slot, key)) => self.indexes.lookup(slot, key),
                None => self.all(),
            };
            candidates.retain(|q| pattern.matches_shape(q));
            candidates.sort_by_key(|q| q.seq());
            candidates
        })
    }

    /// Quads whose `slot` equals `value`, in insertion order. Never
    /// scans the full store.
    pub fn get_by_slot(&self, slot: Slot, value: &Value) -> Vec<QuadRef> {
        self.indexes.lookup(slot, value)
    }

    /// Every distinct value ever stored in `slot` (including values
    /// whose last quad has since been removed, since a slot value stays
    /// indexed only while at least one quad carries it).
    pub fn distinct_values(&self, slot: Slot) -> Vec<Value> {
        self.indexes.distinct_values(slot)
    }

    /// Picks the bound slot (if any) with the fewest matching quads, to
    /// minimize the candidate set a pattern scan has to filter.
    fn most_selective_slot<'p>(&self, pattern: &'p PatternQuad) -> Option<(Slot, &'p Value)> {
        Slot::ALL
            .into_iter()
            .filter_map(|slot| match pattern.get(slot) {
                qw_model::PatternAtom::Constant(v) => Some((slot, v)),
                _ => None,
            })
            .min_by_key(|(slot, v)| self.indexes.selectivity(*slot, v))
    }
}
