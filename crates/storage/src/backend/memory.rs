//! In-memory file store for testing.

use super::FileRecordStream;
use crate::backend::Entry;
use crate::error::{ErrorKind, Result};
use crate::file::{FileRecord, FrontMatter};
use crate::path::{NormalizedPath, normalize};
use crate::FileStore;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
struct Note {
    front_matter: FrontMatter,
    /// Paths this note links to.
    links: Vec<NormalizedPath>,
}

/// In-memory file store for testing.
///
/// Files live in a map behind a [`RwLock`], so all trait methods can operate
/// on `&self` without external synchronisation. Folders exist implicitly
/// whenever a file lives beneath them, or explicitly via
/// [`with_folder`](Self::with_folder).
///
/// Renames behave like a careful host: they refuse to overwrite anything,
/// and they rewrite every link that pointed at the old path. Individual
/// destinations can be made to fail with
/// [`deny_rename_to`](Self::deny_rename_to) to simulate permission problems.
///
/// # Examples
///
/// ```
/// use notemover_storage::backend::MemoryStore;
/// use notemover_storage::{Entry, FileStore, normalize};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MemoryStore::with_files(["Inbox/todo.md", "Index.md"])
///     .with_link("Index.md", "Inbox/todo.md");
///
/// store.rename(&normalize("Inbox/todo.md"), &normalize("Done/todo.md")).await.unwrap();
/// assert_eq!(store.resolve(&normalize("Done")).await.unwrap(), Entry::Folder);
/// assert_eq!(store.links_from("Index.md").await, vec![normalize("Done/todo.md")]);
/// # }
/// ```
pub struct MemoryStore {
    name: String,
    files: RwLock<BTreeMap<NormalizedPath, Note>>,
    folders: RwLock<BTreeSet<NormalizedPath>>,
    denied: BTreeSet<NormalizedPath>,
    renames: AtomicUsize,
}

impl MemoryStore {
    /// Create a store pre-populated with (empty) files.
    ///
    /// Panics if any path normalizes to the store root. If test setup is
    /// wrong, then test should not pass.
    pub fn with_files(paths: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        let mut files = BTreeMap::new();
        for path in paths {
            let normalized = normalize(path.as_ref());
            if normalized.is_root() {
                // The panic here is DELIBERATE. MemoryStore is intended to be
                // used in tests; panics are expected. There is no error result.
                panic!("MemoryStore::with_files: invalid path {:?}", path.as_ref());
            }
            files.insert(normalized, Note::default());
        }
        Self {
            name: "memory".to_string(),
            files: RwLock::new(files),
            folders: RwLock::new(BTreeSet::new()),
            denied: BTreeSet::new(),
            renames: AtomicUsize::new(0),
        }
    }

    /// Change the name of the store.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set a front-matter entry on an existing file. Panics if the file was
    /// not added first.
    pub fn with_front_matter(mut self, path: impl AsRef<str>, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.note_mut(path.as_ref()).front_matter.insert(key.into(), value.into());
        self
    }

    /// Record that the file at `from` links to `to`. Panics if `from` was not
    /// added first.
    pub fn with_link(mut self, from: impl AsRef<str>, to: impl AsRef<str>) -> Self {
        self.note_mut(from.as_ref()).links.push(normalize(to.as_ref()));
        self
    }

    /// Add an (empty) folder.
    pub fn with_folder(mut self, path: impl AsRef<str>) -> Self {
        self.folders.get_mut().insert(normalize(path.as_ref()));
        self
    }

    /// Make every rename *to* `path` fail with
    /// [`PermissionDenied`](ErrorKind::PermissionDenied).
    pub fn deny_rename_to(mut self, path: impl AsRef<str>) -> Self {
        self.denied.insert(normalize(path.as_ref()));
        self
    }

    /// All file paths, in sorted order.
    pub async fn paths(&self) -> Vec<NormalizedPath> {
        self.files.read().await.keys().cloned().collect()
    }

    /// Paths the file at `path` links to (empty if there is no such file).
    pub async fn links_from(&self, path: impl AsRef<str>) -> Vec<NormalizedPath> {
        let path = normalize(path.as_ref());
        self.files.read().await.get(&path).map(|note| note.links.clone()).unwrap_or_default()
    }

    /// Number of renames that completed.
    pub fn rename_count(&self) -> usize {
        self.renames.load(Ordering::SeqCst)
    }

    fn note_mut(&mut self, path: &str) -> &mut Note {
        let normalized = normalize(path);
        match self.files.get_mut().get_mut(&normalized) {
            Some(note) => note,
            None => panic!("MemoryStore: no file at {path:?}"),
        }
    }

    fn entry(files: &BTreeMap<NormalizedPath, Note>, folders: &BTreeSet<NormalizedPath>, path: &NormalizedPath) -> Entry {
        if path.is_root() || folders.contains(path) {
            return Entry::Folder;
        }
        if files.contains_key(path) {
            return Entry::File;
        }
        match files.keys().any(|file| file.parent().is_within(path, true)) {
            true => Entry::Folder,
            false => Entry::Absent,
        }
    }
}
impl Default for MemoryStore {
    fn default() -> Self {
        let files: [&str; 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self) -> FileRecordStream<'a> {
        Box::pin(stream! {
            // Snapshot under the read lock, then drop it before yielding to
            // avoid holding the lock across yield points.
            let records: Vec<FileRecord> = {
                let guard = self.files.read().await;
                guard
                    .iter()
                    .map(|(path, note)| FileRecord::new(path).with_front_matter(note.front_matter.clone()))
                    .collect()
            };
            for record in records {
                yield Ok(record);
            }
        })
    }

    async fn resolve(&self, path: &NormalizedPath) -> Result<Entry> {
        let files = self.files.read().await;
        let folders = self.folders.read().await;
        Ok(Self::entry(&files, &folders, path))
    }

    async fn stat(&self, path: &NormalizedPath) -> Result<FileRecord> {
        let files = self.files.read().await;
        if let Some(note) = files.get(path) {
            return Ok(FileRecord::new(path).with_front_matter(note.front_matter.clone()));
        }
        let folders = self.folders.read().await;
        match Self::entry(&files, &folders, path) {
            Entry::Folder => exn::bail!(ErrorKind::NotAFile(path.clone())),
            _ => exn::bail!(ErrorKind::NotFound(path.clone())),
        }
    }

    async fn rename(&self, from: &NormalizedPath, to: &NormalizedPath) -> Result<()> {
        let mut files = self.files.write().await;
        let folders = self.folders.read().await;
        if self.denied.contains(to) {
            exn::bail!(ErrorKind::PermissionDenied(to.clone()));
        }
        match Self::entry(&files, &folders, from) {
            Entry::File => {},
            Entry::Folder => exn::bail!(ErrorKind::NotAFile(from.clone())),
            Entry::Absent => exn::bail!(ErrorKind::NotFound(from.clone())),
        }
        if Self::entry(&files, &folders, to) != Entry::Absent {
            exn::bail!(ErrorKind::AlreadyExists(to.clone()));
        }

        let note = files.remove(from).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(from.clone())))?;
        files.insert(to.clone(), note);
        for note in files.values_mut() {
            for link in note.links.iter_mut().filter(|link| **link == *from) {
                *link = to.clone();
            }
        }
        self.renames.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_files() {
        let store = MemoryStore::with_files(["a/file.md", "/b//file.md"]);
        assert_eq!(store.paths().await, vec![normalize("a/file.md"), normalize("b/file.md")]);
    }

    #[tokio::test]
    async fn test_resolve() {
        let store = MemoryStore::with_files(["Projects/2024/plan.md"]).with_folder("Empty");
        assert_eq!(store.resolve(&normalize("Projects/2024/plan.md")).await.unwrap(), Entry::File);
        assert_eq!(store.resolve(&normalize("Projects")).await.unwrap(), Entry::Folder);
        assert_eq!(store.resolve(&normalize("Projects/2024")).await.unwrap(), Entry::Folder);
        assert_eq!(store.resolve(&normalize("Empty")).await.unwrap(), Entry::Folder);
        assert_eq!(store.resolve(&normalize("/")).await.unwrap(), Entry::Folder);
        assert_eq!(store.resolve(&normalize("Proj")).await.unwrap(), Entry::Absent);
        assert_eq!(store.resolve(&normalize("Projects/plan.md")).await.unwrap(), Entry::Absent);
    }

    #[tokio::test]
    async fn test_stat() {
        let store = MemoryStore::with_files(["Inbox/note.md"]).with_front_matter("Inbox/note.md", "NoteMover", "disable");
        let record = store.stat(&normalize("Inbox/note.md")).await.unwrap();
        assert_eq!(record.full_name(), "note.md");
        assert_eq!(record.front_matter_entry("NoteMover"), Some("disable"));

        let err = store.stat(&normalize("Inbox")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotAFile(_)));
        let err = store.stat(&normalize("Inbox/missing.md")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rename_moves_file_and_rewrites_links() {
        let store = MemoryStore::with_files(["Inbox/a.md", "Index.md", "Other.md"])
            .with_front_matter("Inbox/a.md", "tag", "x")
            .with_link("Index.md", "Inbox/a.md")
            .with_link("Other.md", "Index.md");
        store.rename(&normalize("Inbox/a.md"), &normalize("Done/a.md")).await.unwrap();

        assert_eq!(store.resolve(&normalize("Inbox/a.md")).await.unwrap(), Entry::Absent);
        assert_eq!(store.stat(&normalize("Done/a.md")).await.unwrap().front_matter_entry("tag"), Some("x"));
        assert_eq!(store.links_from("Index.md").await, vec![normalize("Done/a.md")]);
        assert_eq!(store.links_from("Other.md").await, vec![normalize("Index.md")]);
        assert_eq!(store.rename_count(), 1);
    }

    #[tokio::test]
    async fn test_rename_never_overwrites() {
        let store = MemoryStore::with_files(["Inbox/a.md", "Done/a.md"]).with_folder("Done/sub");
        let err = store.rename(&normalize("Inbox/a.md"), &normalize("Done/a.md")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
        let err = store.rename(&normalize("Inbox/a.md"), &normalize("Done/sub")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::AlreadyExists(_)));
        assert_eq!(store.rename_count(), 0);
    }

    #[tokio::test]
    async fn test_rename_not_found() {
        let store = MemoryStore::default();
        let err = store.rename(&normalize("missing.md"), &normalize("new.md")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_rename_denied() {
        let store = MemoryStore::with_files(["Inbox/a.md"]).deny_rename_to("Locked/a.md");
        let err = store.rename(&normalize("Inbox/a.md"), &normalize("Locked/a.md")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::PermissionDenied(_)));
        assert_eq!(store.resolve(&normalize("Inbox/a.md")).await.unwrap(), Entry::File);
    }

    #[tokio::test]
    async fn test_list() {
        let store = MemoryStore::with_files(["a.md", "b/c.md"]).with_front_matter("b/c.md", "k", "v");
        let files = store.list().await.unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].path, "b/c.md");
        assert_eq!(files[1].front_matter_entry("k"), Some("v"));
    }

    #[test]
    #[should_panic(expected = "invalid path")]
    fn test_with_files_panics_on_root() {
        MemoryStore::with_files(["//"]);
    }
}
