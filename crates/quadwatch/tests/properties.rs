//! Property tests for the three invariants called out as proptest
//! targets: DEDUP, INDEX-CONSISTENCY and AT-MOST-ONCE, exercised across
//! randomized quad sequences.

use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use qw_model::{Slot, Value};
use qw_store::QuadStore;
use quadwatch::pattern::{pq, var, wildcard};
use quadwatch::Store;

/// A small alphabet keeps proptest's shrinker effective while still
/// forcing plenty of dedup and index collisions.
fn symbol_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::symbol("a")),
        Just(Value::symbol("b")),
        Just(Value::symbol("c")),
        Just(Value::symbol("d")),
    ]
}

fn quad_strategy() -> impl Strategy<Value = (Value, Value, Value, Value)> {
    (symbol_strategy(), symbol_strategy(), symbol_strategy(), symbol_strategy())
}

proptest! {
    /// DEDUP: adding the same quad any number of times never grows the
    /// store past one entry for it, and every repeat returns the first
    /// call's context.
    #[test]
    fn dedup_holds_under_repeated_inserts(
        quads in prop::collection::vec(quad_strategy(), 1..50),
        repeat_index in 0usize..50,
    ) {
        let mut store = QuadStore::new();
        let mut contexts = Vec::new();
        for (e, a, v, c) in &quads {
            let (ctx, _) = store.add(e.clone(), a.clone(), v.clone(), c.clone()).unwrap();
            contexts.push(ctx);
        }
        let size_after_first_pass = store.len();

        let idx = repeat_index % quads.len();
        let (e, a, v, c) = &quads[idx];
        let (ctx_repeat, is_new) = store.add(e.clone(), a.clone(), v.clone(), c.clone()).unwrap();
        prop_assert!(!is_new);
        prop_assert_eq!(store.len(), size_after_first_pass);
        prop_assert_eq!(ctx_repeat, contexts[idx].clone());
    }

    /// INDEX-CONSISTENCY: after an arbitrary sequence of adds and
    /// removes, every quad the store reports via `find`/`get_by_slot`
    /// is actually present, and every stored quad is reachable through
    /// each of its four slot indexes.
    #[test]
    fn indexes_stay_consistent_under_add_and_remove(
        adds in prop::collection::vec(quad_strategy(), 1..60),
        removal_mask in prop::collection::vec(any::<bool>(), 1..60),
    ) {
        let mut store = QuadStore::new();
        let mut live: Vec<(Value, Value, Value, Value)> = Vec::new();

        for (i, (e, a, v, c)) in adds.iter().enumerate() {
            store.add(e.clone(), a.clone(), v.clone(), c.clone()).unwrap();
            if !live.iter().any(|(le, la, lv, lc)| le == e && la == a && lv == v && lc == c) {
                live.push((e.clone(), a.clone(), v.clone(), c.clone()));
            }
            if removal_mask.get(i).copied().unwrap_or(false) {
                store.remove(e, a, v, c);
                live.retain(|(le, la, lv, lc)| !(le == e && la == a && lv == v && lc == c));
            }
        }

        for (e, a, v, c) in &live {
            prop_assert!(store.contains(e, a, v, c));
            for slot in Slot::ALL {
                let key = match slot {
                    Slot::Entity => e,
                    Slot::Attribute => a,
                    Slot::Value => v,
                    Slot::Context => c,
                };
                let bucket = store.get_by_slot(slot, key);
                prop_assert!(bucket.iter().any(|q| q.entity() == e && q.attribute() == a && q.value() == v && q.context() == c));
            }
        }

        // Every bucket entry for every distinct value actually used in a
        // live quad must itself be a live quad (no dangling entries).
        for slot in Slot::ALL {
            for value in store.distinct_values(slot) {
                for quad in store.get_by_slot(slot, &value) {
                    prop_assert!(store.contains(quad.entity(), quad.attribute(), quad.value(), quad.context()));
                }
            }
        }
    }

    /// AT-MOST-ONCE: a watcher matching every quad fires its production
    /// exactly once per distinct binding, no matter how many times a
    /// duplicate quad is re-added or how the sequence interleaves.
    #[test]
    fn watcher_fires_at_most_once_per_binding(
        quads in prop::collection::vec(quad_strategy(), 1..80),
    ) {
        let store = Store::new();
        let fire_count: Rc<RefCell<std::collections::HashMap<(String, String), usize>>> =
            Rc::new(RefCell::new(std::collections::HashMap::new()));
        let captured = fire_count.clone();

        store
            .watch()
            .pattern(pq(var("e"), var("a"), wildcard(), wildcard()))
            .produce(move |bindings, _store: &dyn quadwatch::StoreHandle| {
                let e = bindings.get("e").unwrap().to_string();
                let a = bindings.get("a").unwrap().to_string();
                *captured.borrow_mut().entry((e, a)).or_insert(0) += 1;
                Ok(vec![])
            })
            .unwrap();

        for (e, a, v, c) in &quads {
            store.add(e.clone(), a.clone(), v.clone(), Some(c.clone())).unwrap();
        }

        for count in fire_count.borrow().values() {
            prop_assert_eq!(*count, 1);
        }
    }
}
