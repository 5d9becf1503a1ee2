//! Fluent construction of a watcher's pattern list before registering a
//! production.

use qw_engine::{PatternQuad, Production, WatcherId};

use crate::error::Result;
use crate::store::Store;

/// Accumulates positive patterns and NAC sub-patterns for one watcher
/// before it is registered against a [`Store`].
pub struct WatchBuilder<'s> {
    store: &'s Store,
    positive: Vec<PatternQuad>,
    nac: Vec<PatternQuad>,
}

impl<'s> WatchBuilder<'s> {
    pub(crate) fn new(store: &'s Store) -> Self {
        WatchBuilder {
            store,
            positive: Vec::new(),
            nac: Vec::new(),
        }
    }

    /// Appends a positive pattern quad. Patterns fire in the order they
    /// are declared only insofar as that order determines the
    /// watcher's activation key (leftmost literal of the *first*
    /// pattern, per the selective-activation design) — join order
    /// itself is driven by arrival order of matching quads, not
    /// declaration order.
    #[must_use]
    pub fn pattern(mut self, p: PatternQuad) -> Self {
        self.positive.push(p);
        self
    }

    /// Appends a negative application condition: if this sub-pattern
    /// matches at the instant a binding completes, the binding is
    /// vetoed rather than fired.
    #[must_use]
    pub fn nac(mut self, p: PatternQuad) -> Self {
        self.nac.push(p);
        self
    }

    /// Registers the accumulated patterns with `production` as the
    /// watcher's callback. Scans the store for already-satisfying data
    /// before returning, per the order-independence guarantee.
    pub fn produce<P>(self, production: P) -> Result<WatcherId>
    where
        P: Production + 'static,
    {
        Ok(self.store.engine().watch(self.positive, self.nac, production)?)
    }
}
