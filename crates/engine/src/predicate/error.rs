//! Error types for the [`predicate`](super) module.

use derive_more::{Display, Error};

/// A predicate service error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for predicate queries.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The filter expression could not be parsed or evaluated.
    #[display("malformed filter: {_0}")]
    Malformed(#[error(not(source))] String),
    /// The service is not loaded or not reachable.
    #[display("predicate service unavailable")]
    Unavailable,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}
