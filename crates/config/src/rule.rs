//! Rule and folder configuration, in the shape the host persists them.
//!
//! Folder paths are kept exactly as the user typed them. They are only
//! normalized when read through [`SourceFolder::folder`] and friends, and
//! they are never validated here: a nonsensical rule fails later, when the
//! mover tries to use it.

use derive_more::Display;
use notemover_storage::{NormalizedPath, normalize};
use serde::{Deserialize, Serialize};

/// Who asked for a move, and (as the configured trigger mode) which callers
/// are honored.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Caller {
    /// Explicit, user-initiated command.
    #[display("cmd")]
    Cmd,
    /// Passive file-system event.
    #[default]
    #[display("auto")]
    Auto,
}

/// A boolean expression in the predicate service's query language. Opaque
/// to notemover; only ever forwarded.
#[derive(Debug, Display, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterExpression(String);
impl FilterExpression {
    pub fn new(expression: impl Into<String>) -> Self {
        Self(expression.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl From<&str> for FilterExpression {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Where a rule picks files up from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFolder {
    pub path: String,
    #[serde(default)]
    pub with_subfolders: bool,
}
impl SourceFolder {
    pub fn new(path: impl Into<String>, with_subfolders: bool) -> Self {
        Self { path: path.into(), with_subfolders }
    }

    pub fn folder(&self) -> NormalizedPath {
        normalize(&self.path)
    }

    /// Whether a file whose parent folder is `parent` is picked up by this
    /// source folder.
    pub fn matches(&self, parent: &NormalizedPath) -> bool {
        parent.is_within(&self.folder(), self.with_subfolders)
    }
}

/// Where a rule puts files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetFolder {
    pub path: String,
}
impl TargetFolder {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn folder(&self) -> NormalizedPath {
        normalize(&self.path)
    }
}

/// One possible relocation: files in `source_folder` for which `filter`
/// holds belong in `target_folder`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub source_folder: SourceFolder,
    pub target_folder: TargetFolder,
    #[serde(default)]
    pub filter: FilterExpression,
}
impl Rule {
    pub fn new(source_folder: SourceFolder, target_folder: TargetFolder, filter: impl Into<FilterExpression>) -> Self {
        Self {
            source_folder,
            target_folder,
            filter: filter.into(),
        }
    }
}

/// A folder whose files are never moved, regardless of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedFolder {
    pub path: String,
    #[serde(default)]
    pub with_subfolders: bool,
}
impl ExcludedFolder {
    pub fn new(path: impl Into<String>, with_subfolders: bool) -> Self {
        Self { path: path.into(), with_subfolders }
    }

    /// The normalized folder, or `None` for an entry the user left blank.
    /// Blank entries exclude nothing (rather than the store root).
    pub fn folder(&self) -> Option<NormalizedPath> {
        match self.path.trim().is_empty() {
            true => None,
            false => Some(normalize(&self.path)),
        }
    }

    /// Whether a file whose parent folder is `parent` is excluded by this
    /// entry.
    pub fn matches(&self, parent: &NormalizedPath) -> bool {
        self.folder().is_some_and(|folder| parent.is_within(&folder, self.with_subfolders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Inbox", false, "Inbox", true)]
    #[case("/Inbox/", false, "Inbox", true)]
    #[case("Inbox", false, "Inbox/sub", false)]
    #[case("Inbox", true, "Inbox/sub/deeper", true)]
    #[case("Inbox", true, "Inbox2", false)]
    #[case("", false, "/", true)]
    #[case("", true, "Anything/at/all", true)]
    fn test_source_folder_matches(
        #[case] path: &str,
        #[case] with_subfolders: bool,
        #[case] parent: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(SourceFolder::new(path, with_subfolders).matches(&normalize(parent)), expected);
    }

    #[rstest]
    #[case("", true)]
    #[case("   ", true)]
    fn test_blank_excluded_folder_matches_nothing(#[case] path: &str, #[case] with_subfolders: bool) {
        let excluded = ExcludedFolder::new(path, with_subfolders);
        assert_eq!(excluded.folder(), None);
        assert!(!excluded.matches(&normalize("/")));
        assert!(!excluded.matches(&normalize("Inbox")));
    }

    #[test]
    fn test_target_folder_normalizes() {
        assert_eq!(TargetFolder::new("\\Archive\\2024\\").folder(), "Archive/2024");
        assert!(TargetFolder::new("").folder().is_root());
    }

    #[test]
    fn test_caller_display() {
        assert_eq!(Caller::Cmd.to_string(), "cmd");
        assert_eq!(Caller::Auto.to_string(), "auto");
        assert_eq!(Caller::default(), Caller::Auto);
    }
}
