//! Config Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The settings could not be read or did not match the expected shape.
    #[display("invalid settings")]
    Load,
    /// The settings file extension does not map to a known format.
    #[display("unsupported settings format: {}", _0.display())]
    UnsupportedFormat(#[error(not(source))] PathBuf),
    /// No home directory could be determined for the default settings path.
    #[display("no configuration directory available")]
    NoConfigDir,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
