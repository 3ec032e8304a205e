//! Rule-driven relocation of files inside a document store.
//!
//! A [`Rule`](notemover_config::Rule) says: files in *this* folder for which
//! *this* filter holds belong in *that* folder. The primary entry point is
//! [`Mover::process_file`], which runs one file through the configured rules
//! after checking it is not excluded. [`Triggers`] routes host commands and
//! file events to it, and [`bulk::move_all`] runs every file in the store
//! through it on a bounded [`TaskPool`](notemover_asyncutils::TaskPool).
//!
//! Filters are evaluated by an external [`PredicateService`]; files are
//! looked up and moved through the host's
//! [`FileStore`](notemover_storage::FileStore).

pub mod bulk;
pub mod debounce;
pub mod error;
pub mod exclusion;
mod mover;
pub mod predicate;
pub mod rules;
#[cfg(test)]
mod testing;
mod triggers;

pub use crate::bulk::{BULK_CONCURRENCY, BulkEvent, Summary};
pub use crate::mover::{Gate, MoveOutcome, Mover};
pub use crate::predicate::{MoveQuery, PredicateHandle, PredicateService};
pub use crate::rules::{Decision, RuleEngine};
pub use crate::triggers::{EventKind, FileEvent, Triggers};
