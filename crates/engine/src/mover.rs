//! The per-file entry point: gates first, then the rule pass.

use crate::error::{Error, Result};
use crate::exclusion::{self, Exclusion};
use crate::predicate::PredicateHandle;
use crate::rules::{Decision, RuleEngine};
use notemover_config::{Caller, Settings};
use notemover_storage::{FileRecord, NormalizedPath, StoreHandle};
use tracing::{debug, instrument};

/// The check that stopped a file before any rule was evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Only commands are honored and this was a file event.
    ManualOnly,
    /// The file was renamed in place, or moved without changing its name.
    NameUnchanged,
    Excluded(Exclusion),
}

/// What happened to a single file.
#[derive(Debug)]
pub struct MoveOutcome {
    /// At least one move completed.
    pub moved: bool,
    /// Where the file is now.
    pub location: NormalizedPath,
    /// Per-rule decisions, in declared order (empty when a gate stopped the
    /// file).
    pub decisions: Vec<Decision>,
    pub gate: Option<Gate>,
    /// The failed move that cut the pass short.
    pub failure: Option<Error>,
}
impl MoveOutcome {
    fn gated(file: FileRecord, gate: Gate) -> Self {
        Self {
            moved: false,
            location: file.path,
            decisions: Vec::new(),
            gate: Some(gate),
            failure: None,
        }
    }
}

/// Moves one file at a time according to the configured rules.
///
/// Cheap to clone; clones share the store and predicate service.
#[derive(Clone)]
pub struct Mover {
    engine: RuleEngine,
}

impl Mover {
    pub fn new(store: StoreHandle, predicates: PredicateHandle) -> Self {
        Self {
            engine: RuleEngine::new(store, predicates),
        }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn store(&self) -> &StoreHandle {
        self.engine.store()
    }

    /// Process a single file.
    ///
    /// Gates are checked in order before any rule is evaluated:
    /// 1. an `auto` caller while only commands are honored,
    /// 2. a rename (`renamed_from` is set) that kept the file's name,
    /// 3. an excluded folder or the front-matter opt-out.
    ///
    /// The file is then run through every rule (see [`RuleEngine::evaluate`]).
    ///
    /// # Errors
    /// Predicate and store lookup failures are returned as `Err`. A failed
    /// move is not: it is reported in [`MoveOutcome::failure`].
    #[instrument(skip_all, fields(file = %file.path, caller = %caller))]
    pub async fn process_file(
        &self,
        file: FileRecord,
        caller: Caller,
        settings: &Settings,
        renamed_from: Option<&NormalizedPath>,
    ) -> Result<MoveOutcome> {
        if settings.trigger == Caller::Cmd && caller == Caller::Auto {
            debug!("Ignoring file event, moves are command-only");
            return Ok(MoveOutcome::gated(file, Gate::ManualOnly));
        }
        if let Some(from) = renamed_from
            && from.file_name() == file.full_name()
        {
            debug!(from = %from, "Name unchanged by rename");
            return Ok(MoveOutcome::gated(file, Gate::NameUnchanged));
        }
        if let Some(exclusion) = exclusion::check(&file, &settings.excluded_folders) {
            debug!(exclusion = ?exclusion, "File is excluded");
            return Ok(MoveOutcome::gated(file, Gate::Excluded(exclusion)));
        }

        debug!(rules = settings.rules.len(), "Checking rules");
        let evaluation = self.engine.evaluate(&settings.rules, file).await?;
        Ok(MoveOutcome {
            moved: evaluation.moved(),
            location: evaluation.file.path,
            decisions: evaluation.decisions,
            gate: None,
            failure: evaluation.failure,
        })
    }
}
