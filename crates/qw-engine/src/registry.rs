//! Selective activation: routes an incoming quad to the watchers it
//! might extend without scanning every registered watcher.

use ahash::AHashMap;
use qw_model::{Quad, Slot, Value};

use crate::compiled_pattern::ActivationKey;
use crate::watcher::WatcherId;

/// Four literal buckets (one per slot) plus a wildcard bucket.
#[derive(Default)]
pub struct Registry {
    literal: AHashMap<(Slot, Value), Vec<WatcherId>>,
    wildcard: Vec<WatcherId>,
}

impl Registry {
    pub fn insert(&mut self, id: WatcherId, key: &ActivationKey) {
        match key {
            ActivationKey::Literal(slot, value) => {
                self.literal.entry((*slot, value.clone())).or_default().push(id);
            }
            ActivationKey::Wildcard => self.wildcard.push(id),
        }
    }

    pub fn remove(&mut self, id: WatcherId, key: &ActivationKey) {
        match key {
            ActivationKey::Literal(slot, value) => {
                if let Some(bucket) = self.literal.get_mut(&(*slot, value.clone())) {
                    bucket.retain(|w| *w != id);
                }
            }
            ActivationKey::Wildcard => self.wildcard.retain(|w| *w != id),
        }
    }

    /// Candidate watchers for an incoming quad: the union of the four
    /// literal buckets matching the quad's slots, plus every wildcard
    /// watcher. Deduplicated, insertion order not significant here —
    /// the match engine imposes its own deterministic firing order.
    pub fn candidates(&self, quad: &Quad) -> Vec<WatcherId> {
        let mut seen = ahash::AHashSet::default();
        let mut out = Vec::new();
        for slot in Slot::ALL {
            if let Some(bucket) = self.literal.get(&(slot, quad.get(slot).clone())) {
                for id in bucket {
                    if seen.insert(*id) {
                        out.push(*id);
                    }
                }
            }
        }
        for id in &self.wildcard {
            if seen.insert(*id) {
                out.push(*id);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q() -> Quad {
        Quad::new(
            Value::symbol("alice"),
            Value::symbol("age"),
            Value::Number(30.0),
            Value::symbol("default"),
            0,
        )
    }

    #[test]
    fn literal_bucket_matches_on_slot_and_value() {
        let mut reg = Registry::default();
        let key = ActivationKey::Literal(Slot::Attribute, Value::symbol("age"));
        reg.insert(WatcherId(1), &key);

        let candidates = reg.candidates(&q());
        assert_eq!(candidates, vec![WatcherId(1)]);
    }

    #[test]
    fn wildcard_watcher_always_candidate() {
        let mut reg = Registry::default();
        reg.insert(WatcherId(2), &ActivationKey::Wildcard);
        assert_eq!(reg.candidates(&q()), vec![WatcherId(2)]);
    }

    #[test]
    fn unrelated_literal_key_is_not_candidate() {
        let mut reg = Registry::default();
        reg.insert(WatcherId(3), &ActivationKey::Literal(Slot::Entity, Value::symbol("bob")));
        assert!(reg.candidates(&q()).is_empty());
    }

    #[test]
    fn remove_drops_watcher_from_bucket() {
        let mut reg = Registry::default();
        let key = ActivationKey::Literal(Slot::Attribute, Value::symbol("age"));
        reg.insert(WatcherId(1), &key);
        reg.remove(WatcherId(1), &key);
        assert!(reg.candidates(&q()).is_empty());
    }
}
