//! One-shot multi-pattern queries, reusing the same join primitives the
//! incremental matcher uses for NAC checks.

use ahash::AHashSet;
use qw_model::PatternQuad;
use qw_store::QuadStore;

use crate::match_engine::{merge_bindings, nac_violated, substitute, unify_single};
use crate::watcher::Bindings;

/// Runs a one-shot join over `patterns`, filtering each completed
/// binding against `nac`. Results are deduplicated by canonical
/// signature and ordered deterministically by pattern order (depth-first
/// over the first pattern's matches, then the second's, and so on).
pub fn run_query(store: &QuadStore, patterns: &[PatternQuad], nac: &[PatternQuad]) -> Vec<Bindings> {
    let mut results = Vec::new();
    let mut seen = AHashSet::default();
    let empty: Bindings = Bindings::default();
    join(store, patterns, nac, 0, &empty, &mut results, &mut seen);
    results
}

fn join(
    store: &QuadStore,
    patterns: &[PatternQuad],
    nac: &[PatternQuad],
    idx: usize,
    bindings: &Bindings,
    results: &mut Vec<Bindings>,
    seen: &mut AHashSet<u64>,
) {
    if idx == patterns.len() {
        if nac_violated(store, nac, bindings) {
            return;
        }
        let signature = crate::watcher::binding_signature(bindings);
        if seen.insert(signature) {
            results.push(bindings.clone());
        }
        return;
    }

    let narrowed = substitute(&patterns[idx], bindings);
    for quad in store.find(&narrowed) {
        let Some(b_i) = unify_single(&patterns[idx], &quad) else { continue };
        let Some(merged) = merge_bindings(bindings, &b_i) else { continue };
        join(store, patterns, nac, idx + 1, &merged, results, seen);
    }
}
