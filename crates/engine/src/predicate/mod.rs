//! The external predicate service.
//!
//! Filters are written in the query language of a service the host provides
//! (a metadata index over the store). notemover never parses them: it wraps
//! each filter in a [`MoveQuery`], hands it to a [`PredicateService`] and
//! only looks at how many items come back.

pub mod error;

use crate::predicate::error::Result;
use async_trait::async_trait;
use notemover_config::FilterExpression;
use notemover_storage::NormalizedPath;
use std::fmt;
use std::sync::Arc;

pub type PredicateHandle = Arc<dyn PredicateService + Send + Sync>;

/// A listing query: every item inside `scope` for which `filter` holds.
///
/// Its [`Display`](fmt::Display) form is the exact query text sent to the
/// service:
///
/// ```
/// use notemover_engine::predicate::MoveQuery;
/// use notemover_storage::normalize;
///
/// let query = MoveQuery::new(normalize("Inbox/note.md"), "status = \"done\"".into());
/// assert_eq!(query.to_string(), "LIST\nFROM \"Inbox/note.md\"\nWHERE status = \"done\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveQuery {
    scope: NormalizedPath,
    filter: FilterExpression,
}
impl MoveQuery {
    pub fn new(scope: NormalizedPath, filter: FilterExpression) -> Self {
        Self { scope, filter }
    }

    /// The file or folder the query is restricted to.
    pub fn scope(&self) -> &NormalizedPath {
        &self.scope
    }

    pub fn filter(&self) -> &FilterExpression {
        &self.filter
    }
}
impl fmt::Display for MoveQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The whole store is addressed with an empty source.
        let scope = match self.scope.is_root() {
            true => "",
            false => self.scope.as_str(),
        };
        write!(f, "LIST\nFROM \"{scope}\"\nWHERE {}", self.filter)
    }
}

/// Evaluates filter expressions against the store's metadata.
///
/// For a query scoped to a single file the answer must contain zero items
/// (filter is false) or one item (filter is true). Anything else is a
/// contract violation the caller reports.
#[async_trait]
pub trait PredicateService: Send + Sync {
    /// Run `query`, returning the paths of the matching items.
    async fn query(&self, query: &MoveQuery) -> Result<Vec<String>>;
}
