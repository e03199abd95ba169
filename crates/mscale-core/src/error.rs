//! Common error types for kubectl-mscale.

use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised before any cluster call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The resource type identifier matches no known kind or alias.
    #[error("unsupported resource type: {0}")]
    UnsupportedKind(String),

    /// A positional resource argument is not `name` or `kind/name`.
    #[error("invalid resource format: {0}")]
    InvalidResourceToken(String),
}
