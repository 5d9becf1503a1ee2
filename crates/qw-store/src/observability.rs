//! Structured logging and counters for the quad store.
//!
//! `tracing` spans/events carry diagnostics instead of a separate
//! metrics registry, and [`StoreStats`] gives callers a cheap
//! point-in-time counter snapshot.

use std::time::Instant;

use tracing::{debug, trace};

/// Kind of store operation being tracked, used to label trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Add,
    Remove,
    Contains,
    Find,
    BatchInsert,
    BatchRollback,
}

impl OperationType {
    fn label(self) -> &'static str {
        match self {
            OperationType::Add => "store.add",
            OperationType::Remove => "store.remove",
            OperationType::Contains => "store.contains",
            OperationType::Find => "store.find",
            OperationType::BatchInsert => "store.batch_insert",
            OperationType::BatchRollback => "store.batch_rollback",
        }
    }
}

/// Runs `f`, emitting a `tracing` event with its outcome and latency.
///
/// Every public mutation on [`crate::QuadStore`] routes through this so
/// that store activity shows up uniformly in a subscriber without each
/// call site hand-rolling its own span.
pub fn track_operation<F, T>(op: OperationType, f: F) -> T
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = f();
    let latency_us = start.elapsed().as_micros();
    trace!(op = op.label(), latency_us, "store operation completed");
    result
}

/// Read-only counters for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Quads currently stored (after dedup).
    pub quad_count: u64,
    /// Total `add` calls, including ones that deduped against an
    /// existing quad.
    pub adds: u64,
    /// `add` calls that deduped rather than inserting a new quad.
    pub dedup_hits: u64,
    /// Total `remove` calls, including no-ops on an absent quad.
    pub removes: u64,
}

impl StoreStats {
    pub(crate) fn record_add(&mut self, deduped: bool) {
        self.adds += 1;
        if deduped {
            self.dedup_hits += 1;
            debug!(dedup_hits = self.dedup_hits, "quad already present, skipped insert");
        } else {
            self.quad_count += 1;
        }
    }

    pub(crate) fn record_remove(&mut self, removed: bool) {
        self.removes += 1;
        if removed {
            self.quad_count = self.quad_count.saturating_sub(1);
        }
    }
}
