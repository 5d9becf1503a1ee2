//! The crate's public error type: a thin wrapper over [`qw_engine::EngineError`]
//! so callers depending on `quadwatch` never need to name an internal crate.

use thiserror::Error;

/// Result alias for `quadwatch` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors a [`crate::Store`] operation can raise.
#[derive(Error, Debug)]
pub enum Error {
    /// Forwarded from the engine: invalid quad/pattern, a failing
    /// production, or the cascade-depth safety net tripping.
    #[error(transparent)]
    Engine(#[from] qw_engine::EngineError),
}
