//! Files that are never moved.

use notemover_config::ExcludedFolder;
use notemover_storage::{FileRecord, NormalizedPath};

/// Front-matter key that opts a single file out of moving.
pub const MARKER_KEY: &str = "NoteMover";
/// Value of [`MARKER_KEY`] that disables moving.
pub const MARKER_DISABLE: &str = "disable";

/// Why a file is excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// The file lives in (or beneath) this excluded folder.
    Folder(NormalizedPath),
    /// The file's front matter says `NoteMover: disable`.
    Marker,
}

/// The first reason `file` must not be moved, if any. Folders are checked
/// before the front-matter marker; entries with a blank path are ignored.
pub fn check(file: &FileRecord, excluded_folders: &[ExcludedFolder]) -> Option<Exclusion> {
    let parent = file.parent();
    if let Some(folder) = excluded_folders.iter().filter(|excluded| excluded.matches(&parent)).find_map(ExcludedFolder::folder) {
        return Some(Exclusion::Folder(folder));
    }
    match file.front_matter_entry(MARKER_KEY) {
        Some(MARKER_DISABLE) => Some(Exclusion::Marker),
        _ => None,
    }
}

pub fn is_excluded(file: &FileRecord, excluded_folders: &[ExcludedFolder]) -> bool {
    check(file, excluded_folders).is_some()
}
