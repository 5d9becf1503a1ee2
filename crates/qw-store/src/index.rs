//! Four permutation indexes over a single slot each.
//!
//! Watcher patterns bind individual slots independently, so one index
//! per slot — keyed on that slot's value, ordered by insertion
//! sequence — is enough to answer any single-slot lookup in `O(log n)`
//! plus a linear scan of the matching bucket. No composite-key rotation
//! is needed since no pattern here requires a multi-slot prefix scan.

use std::collections::BTreeMap;

use ahash::AHashMap;
use qw_model::{Quad, QuadRef, Slot, Value};

/// One slot's worth of index: value -> quads bearing that value in this
/// slot, ordered by insertion sequence for deterministic iteration.
#[derive(Default, Clone)]
struct SlotIndex {
    by_value: AHashMap<Value, BTreeMap<u64, QuadRef>>,
}

impl SlotIndex {
    fn insert(&mut self, key: Value, quad: QuadRef) {
        self.by_value
            .entry(key)
            .or_default()
            .insert(quad.seq(), quad);
    }

    fn remove(&mut self, key: &Value, seq: u64) {
        if let Some(bucket) = self.by_value.get_mut(key) {
            bucket.remove(&seq);
            if bucket.is_empty() {
                self.by_value.remove(key);
            }
        }
    }

    fn get(&self, key: &Value) -> Option<&BTreeMap<u64, QuadRef>> {
        self.by_value.get(key)
    }

    fn bucket_count(&self, key: &Value) -> usize {
        self.by_value.get(key).map_or(0, BTreeMap::len)
    }
}

/// The four single-slot indexes, maintained in lockstep with every
/// store mutation.
#[derive(Default, Clone)]
pub(crate) struct IndexSet {
    entity: SlotIndex,
    attribute: SlotIndex,
    value: SlotIndex,
    context: SlotIndex,
}

impl IndexSet {
    fn index_for(&self, slot: Slot) -> &SlotIndex {
        match slot {
            Slot::Entity => &self.entity,
            Slot::Attribute => &self.attribute,
            Slot::Value => &self.value,
            Slot::Context => &self.context,
        }
    }

    fn index_for_mut(&mut self, slot: Slot) -> &mut SlotIndex {
        match slot {
            Slot::Entity => &mut self.entity,
            Slot::Attribute => &mut self.attribute,
            Slot::Value => &mut self.value,
            Slot::Context => &mut self.context,
        }
    }

    /// Indexes a freshly stored quad under all four slots.
    pub(crate) fn insert(&mut self, quad: &QuadRef) {
        for slot in Slot::ALL {
            let key = quad.get(slot).clone();
            self.index_for_mut(slot).insert(key, quad.clone());
        }
    }

    /// Removes a quad's entries from all four slots.
    pub(crate) fn remove(&mut self, quad: &Quad) {
        for slot in Slot::ALL {
            self.index_for_mut(slot).remove(quad.get(slot), quad.seq());
        }
    }

    /// Quads whose `slot` equals `key`, ordered by insertion sequence.
    pub(crate) fn lookup(&self, slot: Slot, key: &Value) -> Vec<QuadRef> {
        self.index_for(slot)
            .get(key)
            .map(|bucket| bucket.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of quads carrying `key` in `slot`, without materializing them.
    /// Used to pick the most selective slot when a pattern binds more than one.
    pub(crate) fn selectivity(&self, slot: Slot, key: &Value) -> usize {
        self.index_for(slot).bucket_count(key)
    }

    /// Every distinct value a slot has ever been indexed under.
    pub(crate) fn distinct_values(&self, slot: Slot) -> Vec<Value> {
        self.index_for(slot).by_value.keys().cloned().collect()
    }
}
