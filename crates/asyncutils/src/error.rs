//! Task Pool Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A task pool error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for task pool operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a submitted task never produced an output.
///
/// A task's *own* failure is never reported here; it is part of the task's
/// output type and handed back untouched.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The pool was reset while the task was still waiting in the queue.
    #[display("pool was reset before the task started")]
    Reset,
    /// The task started but never delivered an output (it panicked, or the
    /// runtime shut down underneath it).
    #[display("task was abandoned before completing")]
    Abandoned,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Reset)
    }
}
