//! Errors surfaced by the engine and facade layer.

use thiserror::Error;
use qw_store::StoreError;

/// Result alias for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors the engine can raise.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A quad or pattern failed validation.
    #[error("invalid quad: {0}")]
    InvalidQuad(String),

    /// A production callback returned an error. The triggering `add`
    /// propagates this after restoring invariants up to the last
    /// completed queue item; already-inserted quads from earlier items
    /// remain inserted.
    #[error("production failed: {0}")]
    ProductionError(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The cascade-depth safety net tripped. Propagates like
    /// `ProductionError`.
    #[error("cascade exceeded max depth of {max_depth}")]
    CascadeLimitExceeded { max_depth: usize },
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidQuad(msg) => EngineError::InvalidQuad(msg),
        }
    }
}
