//! Watcher state: compiled patterns, partial matches and fired signatures.

use std::error::Error as StdError;
use std::rc::Rc;

use ahash::{AHashMap, AHashSet};
use qw_model::Value;

use crate::compiled_pattern::CompiledPatterns;

/// Opaque identifier handed back by `watch`, used by `unwatch`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatcherId(pub(crate) u64);

/// Variable name to value assignment. Variable names are interned as
/// `Rc<str>` by the pattern the binding came from, so cloning a
/// `Bindings` map is cheap.
pub type Bindings = AHashMap<Rc<str>, Value>;

/// A quad a production asked to have inserted: `(entity, attribute,
/// value, context)`, context optional (absent means auto-assign).
pub type QuadInsert = (Value, Value, Value, Option<Value>);

/// Boxed error a production callback can fail with.
pub type ProductionFailure = Box<dyn StdError + Send + Sync + 'static>;

/// A production callback: given the completed binding and a handle
/// onto the store, returns quads to insert (the scheduler performs the
/// inserts after the callback returns) or an error.
pub trait Production {
    fn call(&self, bindings: &Bindings, handle: &dyn crate::handle::StoreHandle) -> Result<Vec<QuadInsert>, ProductionFailure>;
}

impl<F> Production for F
where
    F: Fn(&Bindings, &dyn crate::handle::StoreHandle) -> Result<Vec<QuadInsert>, ProductionFailure>,
{
    fn call(&self, bindings: &Bindings, handle: &dyn crate::handle::StoreHandle) -> Result<Vec<QuadInsert>, ProductionFailure> {
        self(bindings, handle)
    }
}

/// A partial match: a binding map plus the set of positive pattern-quad
/// indices it already satisfies, packed as a bitmask (watchers have far
/// fewer than 64 pattern quads in practice).
#[derive(Clone, Debug)]
pub struct PartialMatch {
    pub bindings: Bindings,
    pub satisfied: u64,
}

impl PartialMatch {
    pub fn new(bindings: Bindings, pattern_index: usize) -> Self {
        PartialMatch {
            bindings,
            satisfied: 1 << pattern_index,
        }
    }

    pub fn is_complete(&self, pattern_count: usize) -> bool {
        let all = if pattern_count >= 64 { u64::MAX } else { (1 << pattern_count) - 1 };
        self.satisfied & all == all
    }

    pub fn has_satisfied(&self, pattern_index: usize) -> bool {
        self.satisfied & (1 << pattern_index) != 0
    }
}

/// A registered watcher: compiled patterns, live partial-match state,
/// and the production to invoke on a completed, not-yet-fired binding.
#[derive(Clone)]
pub struct Watcher {
    pub id: WatcherId,
    pub compiled: CompiledPatterns,
    pub production: Rc<dyn Production>,
    pub partial_matches: Vec<PartialMatch>,
    pub fired_signatures: AHashSet<u64>,
}

impl Watcher {
    pub fn pattern_count(&self) -> usize {
        self.compiled.positive.len()
    }
}

/// Canonical signature of a completed binding, for AT-MOST-ONCE
/// dedup: variables sorted alphabetically, values collapsed to their
/// 64-bit hash.
pub fn binding_signature(bindings: &Bindings) -> u64 {
    let mut names: Vec<&Rc<str>> = bindings.keys().collect();
    names.sort();

    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut acc = 0xcbf2_9ce4_8422_2325u64;
    for name in names {
        acc ^= qw_model::hash(&Value::string(name.as_ref()));
        acc = acc.wrapping_mul(PRIME);
        let value = &bindings[name];
        acc ^= qw_model::hash(value);
        acc = acc.wrapping_mul(PRIME);
    }
    acc
}
