//! Engine Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use notemover_storage::NormalizedPath;

/// An engine error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a move failure.
///
/// ### Contract Errors
/// - [`ErrorKind::AmbiguousPredicate`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Predicate`]
/// - [`ErrorKind::Storage`]
/// - [`ErrorKind::Relocation`] - the store refused (or lost the race for) a
///   rename. Carried inside a [`MoveOutcome`](crate::MoveOutcome) rather than
///   returned.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The predicate service could not evaluate a rule's filter.
    #[display("predicate evaluation failed")]
    Predicate,
    /// A query scoped to a single file returned more than one item.
    #[display("predicate returned {_0} items for a single file")]
    AmbiguousPredicate(#[error(not(source))] usize),
    /// A store lookup (resolve, stat, list) failed.
    #[display("store lookup failed")]
    Storage,
    /// Moving the file to the given target failed.
    #[display("could not move file to {_0}")]
    Relocation(#[error(not(source))] NormalizedPath),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage | Self::Relocation(_))
    }
}
