//! Rule evaluation.
//!
//! A file is run through every rule, in declared order, without stopping at
//! the first match. Each rule sees the file where the previous rules left it,
//! so rules cascade: `Inbox -> Drafts` followed by `Drafts -> Published`
//! takes a file from the inbox straight to published in a single pass.

use crate::error::{ErrorKind, Result};
use crate::predicate::{MoveQuery, PredicateHandle};
use exn::ResultExt;
use notemover_config::Rule;
use notemover_storage::{Entry, FileRecord, NormalizedPath, StoreHandle};
use tracing::{debug, error, info};

/// What a single rule does with a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The file's folder is not one the rule picks files up from.
    SkipNoSourceMatch,
    /// The rule's filter does not hold for the file.
    SkipPredicateFalse,
    /// The file already sits at the rule's target.
    SkipAlreadyThere,
    /// A different file already occupies the target.
    SkipCollision(NormalizedPath),
    /// Move the file to the target.
    Apply(NormalizedPath),
}
impl Decision {
    pub fn is_apply(&self) -> bool {
        matches!(self, Self::Apply(_))
    }
}

/// The result of running a file through a rule set.
#[derive(Debug)]
pub struct Evaluation {
    /// The file as it stands after the pass.
    pub file: FileRecord,
    /// One decision per rule evaluated. A rule whose move failed has no
    /// decision; the failure is recorded instead.
    pub decisions: Vec<Decision>,
    /// The relocation failure that cut the pass short, if any.
    pub failure: Option<crate::error::Error>,
}
impl Evaluation {
    /// Whether at least one move completed.
    pub fn moved(&self) -> bool {
        self.decisions.iter().any(Decision::is_apply)
    }
}

/// Applies rules to files, consulting the predicate service for filters and
/// the store for the current state of target paths.
#[derive(Clone)]
pub struct RuleEngine {
    store: StoreHandle,
    predicates: PredicateHandle,
}

impl RuleEngine {
    pub fn new(store: StoreHandle, predicates: PredicateHandle) -> Self {
        Self { store, predicates }
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Where `rule` would put `file`: the target folder joined with the
    /// file's full name.
    pub fn target_path(rule: &Rule, file: &FileRecord) -> NormalizedPath {
        rule.target_folder.folder().join(file.full_name())
    }

    /// Evaluate `rule`'s filter for `file` alone.
    ///
    /// # Errors
    /// - [`ErrorKind::Predicate`] if the service failed.
    /// - [`ErrorKind::AmbiguousPredicate`] if it returned more than one item.
    pub async fn matches(&self, rule: &Rule, file: &FileRecord) -> Result<bool> {
        let query = MoveQuery::new(file.path.clone(), rule.filter.clone());
        debug!(file = %file.path, query = %query, "Querying predicate service");
        let items = self.predicates.query(&query).await.or_raise(|| ErrorKind::Predicate)?;
        match items.len() {
            0 => Ok(false),
            1 => Ok(true),
            n => exn::bail!(ErrorKind::AmbiguousPredicate(n)),
        }
    }

    /// Decide what `rule` would do with `file`, without moving anything.
    ///
    /// Checks run in order and the first that fails wins: source folder,
    /// filter, already at target, target occupied.
    pub async fn decide(&self, rule: &Rule, file: &FileRecord) -> Result<Decision> {
        if !rule.source_folder.matches(&file.parent()) {
            return Ok(Decision::SkipNoSourceMatch);
        }
        if !self.matches(rule, file).await? {
            return Ok(Decision::SkipPredicateFalse);
        }
        let target = Self::target_path(rule, file);
        if target == file.path {
            return Ok(Decision::SkipAlreadyThere);
        }
        // Only a file counts as a collision. Anything else at the target is
        // left for the rename to refuse.
        if self.store.resolve(&target).await.or_raise(|| ErrorKind::Storage)? == Entry::File {
            return Ok(Decision::SkipCollision(target));
        }
        Ok(Decision::Apply(target))
    }

    /// Run `file` through every rule, moving it as rules apply.
    ///
    /// A failed move stops the pass: it is logged, recorded in
    /// [`Evaluation::failure`], and the remaining rules are not evaluated.
    ///
    /// # Errors
    /// Predicate failures abort the pass and are returned as-is (moves
    /// already made by earlier rules stay made).
    pub async fn evaluate(&self, rules: &[Rule], file: FileRecord) -> Result<Evaluation> {
        let mut file = file;
        let mut decisions = Vec::with_capacity(rules.len());
        let mut failure = None;

        for (index, rule) in rules.iter().enumerate() {
            let decision = self.decide(rule, &file).await?;
            match &decision {
                Decision::Apply(target) => {
                    let renamed = self
                        .store
                        .rename(&file.path, target)
                        .await
                        .or_raise(|| ErrorKind::Relocation(target.clone()));
                    if let Err(e) = renamed {
                        error!(file = %file.path, target = %target, rule = index, error = ?e, "Failed to move file");
                        failure = Some(e);
                        break;
                    }
                    info!(from = %file.path, to = %target, rule = index, "Moved file");
                    file = file.relocated(target.clone());
                },
                skipped => debug!(file = %file.path, rule = index, decision = ?skipped, "Rule skipped"),
            }
            decisions.push(decision);
        }

        Ok(Evaluation {
            file,
            decisions,
            failure,
        })
    }

    /// Count the files for which `rule`'s filter holds, scoped to the rule's
    /// source folder. Surfaces malformed filters before a rule is saved.
    ///
    /// The scope is handed to the predicate service as a folder, which
    /// includes its subfolders whatever `with_subfolders` says. The count can
    /// therefore be higher than what the rule would move; it checks the
    /// filter, it does not simulate the rule.
    pub async fn preview(&self, rule: &Rule) -> Result<usize> {
        let query = MoveQuery::new(rule.source_folder.folder(), rule.filter.clone());
        debug!(query = %query, "Previewing rule");
        let items = self.predicates.query(&query).await.or_raise(|| ErrorKind::Predicate)?;
        Ok(items.len())
    }
}
