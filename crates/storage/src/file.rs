//! The per-file snapshot handed to the mover.

use crate::path::{NormalizedPath, normalize};
use std::collections::BTreeMap;

/// Front-matter key/value pairs, as already parsed by the host's metadata
/// cache. Values are kept in their textual form.
pub type FrontMatter = BTreeMap<String, String>;

/// What the mover knows about a file at the moment it is asked to move it.
///
/// Owned by the store; the mover only ever reads a snapshot, and produces a
/// [`relocated`](Self::relocated) copy after it has moved the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Current path of the file, relative to the store root
    pub path: NormalizedPath,
    /// File name without its extension
    pub basename: String,
    /// Extension without the leading dot (empty when there is none)
    pub extension: String,
    /// Front-matter snapshot
    pub front_matter: FrontMatter,
}
impl FileRecord {
    /// Build a record for `path`, splitting the file name into base name and
    /// extension at the last dot.
    ///
    /// ```
    /// use notemover_storage::FileRecord;
    ///
    /// let record = FileRecord::new("Inbox/meeting.notes.md");
    /// assert_eq!(record.basename, "meeting.notes");
    /// assert_eq!(record.extension, "md");
    /// assert_eq!(record.parent(), "Inbox");
    /// ```
    pub fn new(path: impl AsRef<str>) -> Self {
        let path = normalize(path);
        let (basename, extension) = match path.file_name().rsplit_once('.') {
            // Dotfiles (".hidden") have a name, not an extension.
            Some((base, ext)) if !base.is_empty() => (base.to_string(), ext.to_string()),
            _ => (path.file_name().to_string(), String::new()),
        };
        Self {
            path,
            basename,
            extension,
            front_matter: FrontMatter::new(),
        }
    }

    pub fn with_front_matter(mut self, front_matter: FrontMatter) -> Self {
        self.front_matter = front_matter;
        self
    }

    /// The folder currently holding the file.
    pub fn parent(&self) -> NormalizedPath {
        self.path.parent()
    }

    /// The name of the file as it appears inside its folder. Taken from the
    /// path, so a trailing dot (`note.`) is kept.
    pub fn full_name(&self) -> String {
        self.path.file_name().to_string()
    }

    /// Look up a front-matter value.
    pub fn front_matter_entry(&self, key: &str) -> Option<&str> {
        self.front_matter.get(key).map(String::as_str)
    }

    /// The same file after it has been moved to `path`. Name and front matter
    /// are carried over unchanged.
    pub fn relocated(&self, path: NormalizedPath) -> Self {
        Self { path, ..self.clone() }
    }
}
