//! The six end-to-end scenarios and the dedup/rollback/order-independence
//! properties documented alongside the engine design.

use std::cell::RefCell;
use std::rc::Rc;

use quadwatch::pattern::{lit, pq, var, wildcard};
use quadwatch::{Bindings, ProductionFailure, QuadInsert, Store, StoreHandle};

/// A production that appends every completed binding to a shared log,
/// for assertions, plus a handle to read the log back.
fn recorder() -> (
    Rc<RefCell<Vec<Bindings>>>,
    impl Fn(&Bindings, &dyn StoreHandle) -> Result<Vec<QuadInsert>, ProductionFailure> + Clone,
) {
    let log: Rc<RefCell<Vec<Bindings>>> = Rc::new(RefCell::new(Vec::new()));
    let captured = log.clone();
    let production = move |bindings: &Bindings, _store: &dyn StoreHandle| {
        captured.borrow_mut().push(bindings.clone());
        Ok(vec![])
    };
    (log, production)
}

fn binding_of<'a>(b: &'a Bindings, name: &str) -> &'a quadwatch::Value {
    b.get(name).unwrap_or_else(|| panic!("binding for ?{name} missing"))
}

#[test]
fn s1_single_pattern_match() {
    let store = Store::new();
    let (log, production) = recorder();

    store
        .watch()
        .pattern(pq(var("p"), lit("age"), var("a"), wildcard()))
        .produce(production)
        .unwrap();

    store.add("alice", "age", 30i64, Some("c1".into())).unwrap();
    store.add("bob", "name", "Bob", Some("c1".into())).unwrap();

    let fired = log.borrow();
    assert_eq!(fired.len(), 1);
    assert_eq!(binding_of(&fired[0], "p"), &quadwatch::Value::symbol("alice"));
    assert_eq!(binding_of(&fired[0], "a"), &quadwatch::Value::Number(30.0));
}

#[test]
fn s2_cascade() {
    let store = Store::new();

    store
        .watch()
        .pattern(pq(var("x"), lit("status"), lit("raw"), wildcard()))
        .produce(|bindings: &Bindings, store: &dyn StoreHandle| {
            let x = bindings.get("x").unwrap().clone();
            store.add(x, quadwatch::Value::symbol("status"), quadwatch::Value::symbol("verified"), None)?;
            Ok(vec![])
        })
        .unwrap();

    store
        .watch()
        .pattern(pq(var("x"), lit("status"), lit("verified"), wildcard()))
        .produce(|bindings: &Bindings, store: &dyn StoreHandle| {
            let x = bindings.get("x").unwrap().clone();
            store.add(x, quadwatch::Value::symbol("status"), quadwatch::Value::symbol("processed"), None)?;
            Ok(vec![])
        })
        .unwrap();

    store.add("item1", "status", "raw", Some("c1".into())).unwrap();

    let item1 = quadwatch::Value::symbol("item1");
    let status = quadwatch::Value::symbol("status");
    let has_value = |v: &str| {
        store
            .edges()
            .iter()
            .any(|q| q.entity() == &item1 && q.attribute() == &status && q.value() == &quadwatch::Value::symbol(v))
    };
    assert!(has_value("verified"));
    assert!(has_value("processed"));
}

#[test]
fn s3_nac_before_completion() {
    let store = Store::new();
    let (log, production) = recorder();

    store
        .watch()
        .pattern(pq(var("p"), lit("type"), lit("person"), wildcard()))
        .nac(pq(var("p"), lit("deleted"), lit(true), wildcard()))
        .produce(production)
        .unwrap();

    store.add("bob", "deleted", true, Some("c1".into())).unwrap();
    store.add("bob", "type", "person", Some("c2".into())).unwrap();
    assert!(log.borrow().is_empty());

    store.add("alice", "type", "person", Some("c3".into())).unwrap();
    let fired = log.borrow();
    assert_eq!(fired.len(), 1);
    assert_eq!(binding_of(&fired[0], "p"), &quadwatch::Value::symbol("alice"));
}

#[test]
fn s4_multi_quad_join() {
    let store = Store::new();
    let (log, production) = recorder();

    store
        .watch()
        .pattern(pq(var("x"), lit("likes"), var("y"), wildcard()))
        .pattern(pq(var("y"), lit("likes"), var("x"), wildcard()))
        .produce(production)
        .unwrap();

    store.add("alice", "likes", "bob", Some("c1".into())).unwrap();
    store.add("bob", "likes", "alice", Some("c2".into())).unwrap();

    // Two distinct satisfying bindings: {x:alice,y:bob} and {x:bob,y:alice}.
    // The second quad completes both partial matches seeded by the first, in
    // ascending pattern-quad order, so the bob/alice binding fires first.
    let fired = log.borrow();
    assert_eq!(fired.len(), 2);
    assert_eq!(binding_of(&fired[0], "x"), &quadwatch::Value::symbol("bob"));
    assert_eq!(binding_of(&fired[0], "y"), &quadwatch::Value::symbol("alice"));
    assert_eq!(binding_of(&fired[1], "x"), &quadwatch::Value::symbol("alice"));
    assert_eq!(binding_of(&fired[1], "y"), &quadwatch::Value::symbol("bob"));
}

#[test]
fn s5_batch_rollback() {
    let store = Store::new();
    let (log, production) = recorder();

    store
        .watch()
        .pattern(pq(var("x"), lit("step"), lit(1i64), wildcard()))
        .pattern(pq(var("x"), lit("step"), lit(2i64), wildcard()))
        .produce(production)
        .unwrap();

    store.add("p", "step", 1i64, Some("c1".into())).unwrap();

    let result: quadwatch::Result<()> = store.batch(|inner| {
        inner.add("p", "step", 2i64, Some("c2".into()))?;
        Err(quadwatch::Error::Engine(qw_engine::EngineError::InvalidQuad(
            "deliberate rollback".into(),
        )))
    });
    assert!(result.is_err());

    assert!(log.borrow().is_empty());
    assert!(!store.contains(
        &quadwatch::Value::symbol("p"),
        &quadwatch::Value::symbol("step"),
        &quadwatch::Value::Number(2.0),
        &quadwatch::Value::symbol("c2"),
    ));
}

#[test]
fn s6_order_independence_watch_after_data() {
    let store = Store::new();
    store.add("alice", "age", 30i64, Some("c1".into())).unwrap();
    store.add("bob", "name", "Bob", Some("c1".into())).unwrap();

    let (log, production) = recorder();
    store
        .watch()
        .pattern(pq(var("p"), lit("age"), var("a"), wildcard()))
        .produce(production)
        .unwrap();

    let fired = log.borrow();
    assert_eq!(fired.len(), 1);
    assert_eq!(binding_of(&fired[0], "p"), &quadwatch::Value::symbol("alice"));
}

#[test]
fn dedup_leaves_size_unchanged_and_returns_same_context() {
    let store = Store::new();
    let (c1, is_new1) = store.add("alice", "knows", "bob", Some("c1".into())).unwrap();
    assert!(is_new1);
    let size_before = store.size();
    let (c2, is_new2) = store.add("alice", "knows", "bob", Some("c1".into())).unwrap();
    assert!(!is_new2);
    assert_eq!(c1, c2);
    assert_eq!(store.size(), size_before);
}

#[test]
fn auto_context_is_monotonic_edge_n() {
    let store = Store::new();
    let (c0, _) = store.add("a", "p", "1", None).unwrap();
    let (c1, _) = store.add("a", "p", "2", None).unwrap();
    assert_eq!(c0, quadwatch::Value::string("edge:0"));
    assert_eq!(c1, quadwatch::Value::string("edge:1"));
}

#[test]
fn unwatch_is_idempotent_on_unknown_handle() {
    let store = Store::new();
    let (_log, production) = recorder();
    let id = store
        .watch()
        .pattern(pq(wildcard(), wildcard(), wildcard(), wildcard()))
        .produce(production)
        .unwrap();
    assert!(store.unwatch(id));
    assert!(!store.unwatch(id));
}
