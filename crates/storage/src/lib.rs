//! Document store access for notemover.
//!
//! The store itself (a note vault, a synced folder, ...) belongs to the host
//! application. This crate describes what the mover needs from it:
//!
//! - [`NormalizedPath`] and [`normalize`]: the one canonical path form every
//!   comparison uses.
//! - [`FileRecord`]: the snapshot of a file the mover reasons about.
//! - [`FileStore`]: the host capability to look paths up, list files, and
//!   relocate a file while keeping links to it intact.

pub mod backend;
pub mod error;
mod file;
mod path;

pub use crate::backend::{Entry, FileStore};
pub use crate::file::{FileRecord, FrontMatter};
pub use crate::path::{NormalizedPath, ROOT, normalize};
use std::sync::Arc;

pub type StoreHandle = Arc<dyn FileStore + Send + Sync>;
