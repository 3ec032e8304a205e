//! File store trait and implementations.
//!
//! This module defines the [`FileStore`] trait: the slice of the host's
//! document store that the mover depends on. The host provides the real
//! implementation; this crate ships wrappers and test doubles.

#[cfg(feature = "mock")]
mod memory;
mod ro;

#[cfg(feature = "mock")]
pub use self::memory::MemoryStore;
pub use self::ro::ReadOnlyStore;
use crate::error::Result;
use crate::file::FileRecord;
use crate::path::NormalizedPath;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::pin::Pin;

pub type FileRecordStream<'a> = Pin<Box<dyn Stream<Item = Result<FileRecord>> + Send + 'a>>;

/// What, if anything, lives at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    File,
    Folder,
    Absent,
}

/// Unified interface for the host's document store.
///
/// All paths are store-relative [`NormalizedPath`]s. Implementations never
/// assume exclusive access: other writers may create, move or delete files at
/// any time, including between a [`resolve`](Self::resolve) and a
/// [`rename`](Self::rename).
///
/// # Examples
///
/// ```
/// use notemover_storage::{Entry, FileStore, normalize, error::Result};
///
/// async fn move_unless_taken(store: &dyn FileStore, from: &str, to: &str) -> Result<bool> {
///     let (from, to) = (normalize(from), normalize(to));
///     if store.resolve(&to).await? == Entry::File {
///         return Ok(false);
///     }
///     store.rename(&from, &to).await?;
///     Ok(true)
/// }
/// ```
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Name of the store, used for logging only.
    fn name(&self) -> &str;

    /// List every file in the store.
    ///
    /// Default implementation of this method is to collect all the results
    /// from [`list_stream()`](Self::list_stream) into a [`Vec`] before
    /// returning.
    async fn list(&self) -> Result<Vec<FileRecord>> {
        self.list_stream().try_collect().await
    }

    /// Stream a snapshot of every file in the store.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures::TryStreamExt;
    /// # use notemover_storage::{FileStore, error::Result};
    /// # async fn example(store: &dyn FileStore) -> Result<()> {
    /// let mut stream = store.list_stream();
    /// while let Some(file) = stream.try_next().await? {
    ///     println!("{} ({} front-matter keys)", file.path, file.front_matter.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    fn list_stream<'a>(&'a self) -> FileRecordStream<'a>;

    /// Find out whether a file, a folder, or nothing lives at `path`.
    async fn resolve(&self, path: &NormalizedPath) -> Result<Entry>;

    /// Take a fresh snapshot of the file at `path`.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if nothing is
    /// there and [`NotAFile`](crate::error::ErrorKind::NotAFile) for folders.
    async fn stat(&self, path: &NormalizedPath) -> Result<FileRecord>;

    /// Relocate a file, rewriting every link elsewhere in the store that
    /// points at it. A plain byte move is not enough.
    ///
    /// # Notes
    /// - Missing parent folders of `to` are created as needed.
    /// - Returns [`NotFound`](crate::error::ErrorKind::NotFound) if `from`
    ///   does not exist.
    /// - Returns [`AlreadyExists`](crate::error::ErrorKind::AlreadyExists)
    ///   if `to` is occupied; existing entries are never overwritten.
    async fn rename(&self, from: &NormalizedPath, to: &NormalizedPath) -> Result<()>;
}
