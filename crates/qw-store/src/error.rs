//! Errors surfaced by the quad store layer.

use thiserror::Error;

/// Result alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors the store can raise.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A quad failed validation before being stored.
    #[error("invalid quad: {0}")]
    InvalidQuad(String),
}
