//! Path normalization and folder matching.
//!
//! Every path inside a document store is compared in one canonical,
//! slash-separated form. [`normalize`] is the only way to produce a
//! [`NormalizedPath`], so two paths that refer to the same location always
//! compare equal once normalized.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// The root folder of a store.
pub const ROOT: &str = "/";

/// A store-relative path in canonical slash form.
///
/// Files and folders are written without leading or trailing separators
/// (`Inbox/note.md`, `Projects/2024`); the store root is written as `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NormalizedPath(String);

/// Canonicalize a slash-separated path.
///
/// - backslashes are treated as separators,
/// - non-breaking spaces (`U+00A0`, `U+202F`) become plain spaces,
/// - runs of separators collapse into one,
/// - leading and trailing separators are stripped,
/// - an empty result is the root, `/`.
///
/// `.` and `..` segments are kept as-is; the store decides what they mean.
///
/// # Examples
///
/// ```
/// use notemover_storage::normalize;
///
/// assert_eq!(normalize("Inbox//today\\note.md/"), "Inbox/today/note.md");
/// assert_eq!(normalize("/Projects/"), "Projects");
/// assert_eq!(normalize(""), "/");
/// ```
pub fn normalize(path: impl AsRef<str>) -> NormalizedPath {
    let cleaned: String = path
        .as_ref()
        .chars()
        .map(|c| match c {
            '\\' => '/',
            '\u{00A0}' | '\u{202F}' => ' ',
            c => c,
        })
        .collect();
    let joined = cleaned.split('/').filter(|segment| !segment.is_empty()).collect::<Vec<_>>().join("/");
    match joined.is_empty() {
        true => NormalizedPath(ROOT.to_string()),
        false => NormalizedPath(joined),
    }
}

impl NormalizedPath {
    pub fn root() -> Self {
        Self(ROOT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT
    }

    /// The folder containing this path. The parent of a top-level entry (and
    /// of the root itself) is the root.
    pub fn parent(&self) -> NormalizedPath {
        if self.is_root() {
            return Self::root();
        }
        match self.0.rsplit_once('/') {
            Some((parent, _)) => NormalizedPath(parent.to_string()),
            None => Self::root(),
        }
    }

    /// The last segment of the path (empty for the root).
    pub fn file_name(&self) -> &str {
        if self.is_root() {
            return "";
        }
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Append `name` to this folder path.
    ///
    /// ```
    /// use notemover_storage::{NormalizedPath, normalize};
    ///
    /// assert_eq!(normalize("Archive").join("note.md"), "Archive/note.md");
    /// assert_eq!(NormalizedPath::root().join("note.md"), "note.md");
    /// ```
    pub fn join(&self, name: impl AsRef<str>) -> NormalizedPath {
        normalize(format!("{}/{}", self.0, name.as_ref()))
    }

    /// Whether this folder path is `folder` itself or, when
    /// `with_subfolders` is set, anywhere beneath it.
    ///
    /// Descent is decided segment by segment: `Archive2` is *not* beneath
    /// `Archive`. Every folder is beneath the root.
    ///
    /// ```
    /// use notemover_storage::normalize;
    ///
    /// let archive = normalize("Archive");
    /// assert!(normalize("Archive").is_within(&archive, false));
    /// assert!(normalize("Archive/2024/q1").is_within(&archive, true));
    /// assert!(!normalize("Archive/2024").is_within(&archive, false));
    /// assert!(!normalize("Archive2").is_within(&archive, true));
    /// ```
    pub fn is_within(&self, folder: &NormalizedPath, with_subfolders: bool) -> bool {
        if self == folder {
            return true;
        }
        if !with_subfolders {
            return false;
        }
        folder.is_root() || self.0.strip_prefix(folder.as_str()).is_some_and(|rest| rest.starts_with('/'))
    }
}

impl From<String> for NormalizedPath {
    fn from(value: String) -> Self {
        normalize(value)
    }
}
impl From<&str> for NormalizedPath {
    fn from(value: &str) -> Self {
        normalize(value)
    }
}
impl From<NormalizedPath> for String {
    fn from(value: NormalizedPath) -> Self {
        value.0
    }
}
impl Deref for NormalizedPath {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}
impl AsRef<str> for NormalizedPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl Borrow<str> for NormalizedPath {
    fn borrow(&self) -> &str {
        &self.0
    }
}
impl fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
impl PartialEq<str> for NormalizedPath {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
impl PartialEq<&str> for NormalizedPath {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Inbox/note.md", "Inbox/note.md")]
    #[case("/Inbox/note.md", "Inbox/note.md")]
    #[case("Inbox/note.md/", "Inbox/note.md")]
    #[case("Inbox//sub///note.md", "Inbox/sub/note.md")]
    #[case("Inbox\\sub\\note.md", "Inbox/sub/note.md")]
    #[case("Inbox\u{00A0}Zero/note.md", "Inbox Zero/note.md")]
    #[case("Inbox\u{202F}Zero", "Inbox Zero")]
    #[case("a/./b/../c", "a/./b/../c")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input), expected);
    }

    #[rstest]
    #[case("")]
    #[case("/")]
    #[case("//")]
    #[case("\\")]
    fn test_normalize_to_root(#[case] input: &str) {
        assert!(normalize(input).is_root());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize("//Projects\\2024//plan.md/");
        assert_eq!(normalize(once.as_str()), once);
    }

    #[rstest]
    #[case("Inbox/note.md", "Inbox")]
    #[case("a/b/c/note.md", "a/b/c")]
    #[case("note.md", "/")]
    #[case("/", "/")]
    fn test_parent(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(normalize(path).parent(), expected);
    }

    #[rstest]
    #[case("/")]
    #[case("note.md")]
    #[case("Inbox/note.md")]
    fn test_parent_is_canonical(#[case] path: &str) {
        let parent = normalize(path).parent();
        assert_eq!(normalize(parent.as_str()), parent);
    }

    #[test]
    fn test_root_parent_is_root() {
        assert!(normalize("/").parent().is_root());
        assert!(NormalizedPath::root().parent().is_root());
    }

    #[rstest]
    #[case("Inbox/note.md", "note.md")]
    #[case("note", "note")]
    #[case("/", "")]
    fn test_file_name(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(normalize(path).file_name(), expected);
    }

    #[rstest]
    #[case("Excluded", "Excluded", false, true)]
    #[case("Excluded/a", "Excluded", false, false)]
    #[case("Excluded/a", "Excluded", true, true)]
    #[case("Excluded/a/b/c", "Excluded", true, true)]
    #[case("Excluded2", "Excluded", true, false)]
    #[case("Excluded2/a", "Excluded", true, false)]
    #[case("Other", "Excluded", true, false)]
    #[case("/", "/", false, true)]
    #[case("Inbox", "/", false, false)]
    #[case("Inbox/deep", "/", true, true)]
    fn test_is_within(#[case] path: &str, #[case] folder: &str, #[case] subfolders: bool, #[case] expected: bool) {
        assert_eq!(normalize(path).is_within(&normalize(folder), subfolders), expected);
    }
}
