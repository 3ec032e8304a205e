//! Storage Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use crate::path::NormalizedPath;
use derive_more::{Display, Error};

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No file exists at the path
    #[display("file not found: {_0}")]
    NotFound(#[error(not(source))] NormalizedPath),
    /// The store refused the operation (permissions, locked file, etc.)
    #[display("permission denied: {_0}")]
    PermissionDenied(#[error(not(source))] NormalizedPath),
    /// Something (file or folder) already occupies the destination path
    #[display("path already exists: {_0}")]
    AlreadyExists(#[error(not(source))] NormalizedPath),
    /// The path points at a folder where a file was expected
    #[display("not a file: {_0}")]
    NotAFile(#[error(not(source))] NormalizedPath),
    /// Backend-specific error
    #[display("backend error: {_0}")]
    BackendError(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// An occupied destination may be freed by the time of a retry, so a
    /// racing rename counts as retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::AlreadyExists(_) | Self::BackendError(_))
    }
}
