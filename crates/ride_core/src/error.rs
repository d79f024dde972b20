use thiserror::Error;

/// Errors surfaced by dispatch operations.
///
/// Validation, not-found and conflict cases are detected before any mutation;
/// `Internal` means a persistence failure with no partial effect visible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(&'static str),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("internal error: {0}")]
    Internal(String),
}
