//! Predicate service doubles shared by the engine's tests.

use crate::predicate::error::{ErrorKind, Result};
use crate::predicate::{MoveQuery, PredicateService};
use async_trait::async_trait;
use exn::ResultExt;
use notemover_storage::StoreHandle;
use std::sync::Mutex;

/// Understands exactly one kind of filter, `key = "value"`, and evaluates it
/// against the front matter of the files currently in the store.
pub(crate) struct FrontMatterPredicates {
    store: StoreHandle,
    queries: Mutex<Vec<MoveQuery>>,
}
impl FrontMatterPredicates {
    pub(crate) fn new(store: StoreHandle) -> Self {
        Self {
            store,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Every query received so far, in order.
    pub(crate) fn queries(&self) -> Vec<MoveQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PredicateService for FrontMatterPredicates {
    async fn query(&self, query: &MoveQuery) -> Result<Vec<String>> {
        self.queries.lock().unwrap().push(query.clone());
        let filter = query.filter().as_str();
        let Some((key, value)) = filter.split_once('=') else {
            exn::bail!(ErrorKind::Malformed(filter.to_string()));
        };
        let (key, value) = (key.trim(), value.trim().trim_matches('"'));
        let scope = query.scope();
        let files = self.store.list().await.or_raise(|| ErrorKind::Unavailable)?;
        Ok(files
            .into_iter()
            .filter(|file| file.path == *scope || file.parent().is_within(scope, true))
            .filter(|file| file.front_matter_entry(key) == Some(value))
            .map(|file| file.path.to_string())
            .collect())
    }
}

/// Answers every query with the same number of made-up items.
pub(crate) struct FixedPredicates(pub(crate) usize);

#[async_trait]
impl PredicateService for FixedPredicates {
    async fn query(&self, query: &MoveQuery) -> Result<Vec<String>> {
        Ok((0..self.0).map(|n| format!("{}#{n}", query.scope())).collect())
    }
}
