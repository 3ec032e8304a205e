//! Read-only (dry-run) file store.
//!
//! This module provides a store implementation that wraps another store and
//! prevents renames from executing, while still indicating success on
//! return. Running a move pass against it shows what *would* move without
//! touching anything.

use async_trait::async_trait;

use crate::backend::{Entry, FileRecordStream};
use crate::{FileRecord, FileStore, NormalizedPath, StoreHandle, error::Result};

/// Read-only file store.
///
/// Wraps another store and silently drops all renames, logging an
/// [`info event`](tracing::Event) for each one. Lookups go straight to the
/// wrapped store, so a dry run sees the real state of the store (a file
/// "moved" earlier in the same dry run is still found at its old path).
#[derive(Clone)]
pub struct ReadOnlyStore {
    inner: StoreHandle,
}
impl ReadOnlyStore {
    pub fn new(inner: StoreHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl FileStore for ReadOnlyStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn list_stream<'a>(&'a self) -> FileRecordStream<'a> {
        self.inner.list_stream()
    }

    async fn resolve(&self, path: &NormalizedPath) -> Result<Entry> {
        self.inner.resolve(path).await
    }

    async fn stat(&self, path: &NormalizedPath) -> Result<FileRecord> {
        self.inner.stat(path).await
    }

    async fn rename(&self, from: &NormalizedPath, to: &NormalizedPath) -> Result<()> {
        tracing::info!(store = self.name(), from = %from, to = %to, "Skipping rename during read-only mode");
        Ok(())
    }
}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use crate::normalize;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_rename_is_dropped() {
        let inner: StoreHandle = Arc::new(MemoryStore::with_files(["Inbox/a.md"]));
        let store = ReadOnlyStore::new(Arc::clone(&inner));
        store.rename(&normalize("Inbox/a.md"), &normalize("Done/a.md")).await.unwrap();
        assert_eq!(inner.resolve(&normalize("Inbox/a.md")).await.unwrap(), Entry::File);
        assert_eq!(inner.resolve(&normalize("Done/a.md")).await.unwrap(), Entry::Absent);
    }

    #[tokio::test]
    async fn test_reads_pass_through() {
        let store = ReadOnlyStore::new(Arc::new(MemoryStore::with_files(["Inbox/a.md"]).with_name("vault")));
        assert_eq!(store.name(), "vault");
        assert_eq!(store.resolve(&normalize("Inbox")).await.unwrap(), Entry::Folder);
        assert_eq!(store.stat(&normalize("Inbox/a.md")).await.unwrap().basename, "a");
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
