//! The incremental match engine: steps 1-5 of extending a watcher's
//! partial matches with one incoming quad.

use ahash::AHashMap;
use qw_model::{PatternAtom, PatternQuad, Quad, Slot};
use qw_store::QuadStore;

use crate::watcher::{binding_signature, Bindings, PartialMatch, Watcher};

/// Attempts to unify `pattern` against `quad` in isolation, binding
/// each variable slot and checking that repeated variables within the
/// same pattern quad agree.
pub fn unify_single(pattern: &PatternQuad, quad: &Quad) -> Option<Bindings> {
    let mut bindings: Bindings = AHashMap::default();
    for slot in Slot::ALL {
        match pattern.get(slot) {
            PatternAtom::Constant(v) => {
                if v != quad.get(slot) {
                    return None;
                }
            }
            PatternAtom::Wildcard => {}
            PatternAtom::Variable(name) => {
                if let Some(existing) = bindings.get(name.as_ref()) {
                    if existing != quad.get(slot) {
                        return None;
                    }
                } else {
                    bindings.insert(name.clone(), quad.get(slot).clone());
                }
            }
        }
    }
    Some(bindings)
}

/// Merges two binding maps, failing if they disagree on a shared
/// variable.
pub fn merge_bindings(a: &Bindings, b: &Bindings) -> Option<Bindings> {
    let mut merged = a.clone();
    for (k, v) in b {
        if let Some(existing) = merged.get(k) {
            if existing != v {
                return None;
            }
        } else {
            merged.insert(k.clone(), v.clone());
        }
    }
    Some(merged)
}

/// Substitutes bound variables into `pattern`, leaving unbound
/// variables and wildcards untouched, for use as a NAC point query.
pub fn substitute(pattern: &PatternQuad, bindings: &Bindings) -> PatternQuad {
    let atoms: Vec<PatternAtom> = pattern
        .atoms()
        .into_iter()
        .map(|atom| match atom {
            PatternAtom::Variable(name) => bindings
                .get(name.as_ref())
                .map(|v| PatternAtom::Constant(v.clone()))
                .unwrap_or_else(|| atom.clone()),
            other => other.clone(),
        })
        .collect();
    PatternQuad::new(atoms[0].clone(), atoms[1].clone(), atoms[2].clone(), atoms[3].clone())
}

/// True if any NAC sub-pattern, substituted with `bindings`, finds at
/// least one quad in the store. Always queries live, never cached:
/// staleness here would violate the NAC-at-commit-time invariant.
pub fn nac_violated(store: &QuadStore, nac: &[PatternQuad], bindings: &Bindings) -> bool {
    nac.iter()
        .any(|pattern| !store.find(&substitute(pattern, bindings)).is_empty())
}

/// Feeds one incoming quad through a single watcher's partial-match
/// state, returning the bindings (already NAC-checked and recorded
/// against AT-MOST-ONCE) whose production should now fire, in firing
/// order: ascending completed pattern-quad index, then insertion order
/// of the partial match that completed.
pub fn feed_quad(store: &QuadStore, watcher: &mut Watcher, quad: &Quad) -> Vec<Bindings> {
    let n = watcher.pattern_count();
    let direct: Vec<Option<Bindings>> = watcher
        .compiled
        .positive
        .iter()
        .map(|p| unify_single(p, quad))
        .collect();

    let mut to_fire = Vec::new();
    let mut new_partials = Vec::new();

    // Step 2: extend existing partial matches, outer loop by ascending
    // pattern index, inner loop over a pre-pass snapshot so partial
    // matches created this round are not replayed in the same pass.
    let existing_snapshot = watcher.partial_matches.clone();
    for i in 0..n {
        let Some(b_i) = &direct[i] else { continue };
        for pm in &existing_snapshot {
            if pm.has_satisfied(i) {
                continue;
            }
            let Some(merged) = merge_bindings(&pm.bindings, b_i) else { continue };
            let mut next = PartialMatch {
                bindings: merged,
                satisfied: pm.satisfied | (1 << i),
            };
            if next.is_complete(n) {
                complete_match(store, watcher, &mut next.bindings, &mut to_fire);
            } else {
                new_partials.push(next);
            }
        }
    }

    // Step 3: seed a fresh partial match per directly-matched pattern.
    for i in 0..n {
        let Some(b_i) = &direct[i] else { continue };
        if n == 1 {
            let mut bindings = b_i.clone();
            complete_match(store, watcher, &mut bindings, &mut to_fire);
            continue;
        }
        let already_seeded = watcher
            .partial_matches
            .iter()
            .chain(new_partials.iter())
            .any(|pm| pm.satisfied == 1 << i && pm.bindings == *b_i);
        if !already_seeded {
            new_partials.push(PartialMatch::new(b_i.clone(), i));
        }
    }

    watcher.partial_matches.extend(new_partials);
    to_fire
}

/// NAC check + at-most-once check for a binding that just became
/// complete; on success, records the signature and appends the binding
/// to `to_fire`.
fn complete_match(store: &QuadStore, watcher: &mut Watcher, bindings: &mut Bindings, to_fire: &mut Vec<Bindings>) {
    if nac_violated(store, &watcher.compiled.nac, bindings) {
        tracing::trace!(watcher = watcher.id.0, "match rejected by NAC");
        return;
    }
    let signature = binding_signature(bindings);
    if !watcher.fired_signatures.insert(signature) {
        tracing::trace!(watcher = watcher.id.0, "match dropped by at-most-once");
        return;
    }
    to_fire.push(std::mem::take(bindings));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiled_pattern::compile;
    use crate::watcher::WatcherId;
    use qw_model::{PatternAtom, Value};
    use std::rc::Rc as StdRc;

    fn make_watcher(patterns: Vec<PatternQuad>) -> Watcher {
        let compiled = compile(patterns, vec![]).unwrap();
        Watcher {
            id: WatcherId(1),
            compiled,
            production: StdRc::new(|_: &Bindings, _: &dyn crate::handle::StoreHandle| Ok(vec![])),
            partial_matches: Vec::new(),
            fired_signatures: ahash::AHashSet::default(),
        }
    }

    fn quad(e: &str, a: &str, v: &str, c: &str) -> Quad {
        Quad::new(Value::symbol(e), Value::symbol(a), Value::symbol(v), Value::symbol(c), 0)
    }

    #[test]
    fn single_pattern_fires_immediately() {
        let pattern = PatternQuad::new(
            PatternAtom::var("p"),
            PatternAtom::constant(Value::symbol("age")),
            PatternAtom::var("a"),
            PatternAtom::Wildcard,
        );
        let mut watcher = make_watcher(vec![pattern]);
        let store = QuadStore::new();
        let fired = feed_quad(&store, &mut watcher, &quad("alice", "age", "30", "c1"));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].get("p").unwrap(), &Value::symbol("alice"));
    }

    #[test]
    fn two_pattern_watcher_requires_both_quads() {
        let p1 = PatternQuad::new(
            PatternAtom::var("x"),
            PatternAtom::constant(Value::symbol("likes")),
            PatternAtom::var("y"),
            PatternAtom::Wildcard,
        );
        let p2 = PatternQuad::new(
            PatternAtom::var("y"),
            PatternAtom::constant(Value::symbol("likes")),
            PatternAtom::var("x"),
            PatternAtom::Wildcard,
        );
        let mut watcher = make_watcher(vec![p1, p2]);
        let store = QuadStore::new();

        let fired1 = feed_quad(&store, &mut watcher, &quad("alice", "likes", "bob", "c1"));
        assert!(fired1.is_empty());
        assert_eq!(watcher.partial_matches.len(), 1);

        let fired2 = feed_quad(&store, &mut watcher, &quad("bob", "likes", "alice", "c2"));
        assert_eq!(fired2.len(), 1);
    }

    #[test]
    fn at_most_once_drops_duplicate_completion() {
        let pattern = PatternQuad::new(
            PatternAtom::var("p"),
            PatternAtom::constant(Value::symbol("age")),
            PatternAtom::var("a"),
            PatternAtom::Wildcard,
        );
        let mut watcher = make_watcher(vec![pattern]);
        let store = QuadStore::new();
        let q = quad("alice", "age", "30", "c1");
        let first = feed_quad(&store, &mut watcher, &q);
        let second = feed_quad(&store, &mut watcher, &q);
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }
}
