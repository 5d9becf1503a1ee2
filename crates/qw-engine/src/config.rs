//! Runtime configuration for the engine.

/// Tunables for one engine instance.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Maximum number of queue-drain rounds one external call may
    /// trigger transitively before the engine aborts it with
    /// [`crate::EngineError::CascadeLimitExceeded`]. A safety net, not
    /// an algorithmic step — well-behaved watcher sets never approach it.
    pub max_cascade_depth: usize,
    /// Emit a `tracing::debug!` event for every pattern compiled by
    /// `watch`, beyond the always-on spans around public operations.
    pub trace_pattern_compilation: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_cascade_depth: 10_000,
            trace_pattern_compilation: false,
        }
    }
}
