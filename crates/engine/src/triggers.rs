//! The invocation surface the host wires its commands and file events to.

use crate::bulk::{self, BulkEvent, Summary};
use crate::debounce::Debouncer;
use crate::error::{ErrorKind, Result};
use crate::mover::{MoveOutcome, Mover};
use exn::ResultExt;
use futures::Stream;
use notemover_config::{Caller, Settings};
use notemover_storage::NormalizedPath;
use notemover_storage::error::ErrorKind as StorageErrorKind;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tracing::debug;

/// A file-system change reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileEvent {
    Created(NormalizedPath),
    Modified(NormalizedPath),
    Renamed { from: NormalizedPath, to: NormalizedPath },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Created,
    Modified,
    Renamed,
}

impl FileEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Created(_) => EventKind::Created,
            Self::Modified(_) => EventKind::Modified,
            Self::Renamed { .. } => EventKind::Renamed,
        }
    }

    /// Where the file is now.
    pub fn path(&self) -> &NormalizedPath {
        match self {
            Self::Created(path) | Self::Modified(path) => path,
            Self::Renamed { to, .. } => to,
        }
    }
}

/// Commands and file events, routed to a [`Mover`] with the right caller.
///
/// Commands (`move_file`, `move_all`) act as [`Caller::Cmd`]. File events
/// act as [`Caller::Auto`] and are debounced per event kind and path.
pub struct Triggers {
    mover: Mover,
    settings: RwLock<Arc<Settings>>,
    debouncer: Debouncer<(EventKind, NormalizedPath)>,
}

impl Triggers {
    pub fn new(mover: Mover, settings: Settings) -> Self {
        Self::with_debounce_window(mover, settings, crate::debounce::DEFAULT_WINDOW)
    }

    pub fn with_debounce_window(mover: Mover, settings: Settings, window: Duration) -> Self {
        Self {
            mover,
            settings: RwLock::new(Arc::new(settings)),
            debouncer: Debouncer::new(window),
        }
    }

    /// The settings passes started from now on will use.
    pub fn settings(&self) -> Arc<Settings> {
        Arc::clone(&self.settings.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Swap in new settings. Passes already running keep the old ones.
    pub fn update_settings(&self, settings: Settings) {
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(settings);
    }

    /// Move a single file on the user's request.
    pub async fn move_file(&self, path: &NormalizedPath) -> Result<MoveOutcome> {
        let file = self.mover.store().stat(path).await.or_raise(|| ErrorKind::Storage)?;
        self.mover.process_file(file, Caller::Cmd, &self.settings(), None).await
    }

    /// Move every file in the store on the user's request.
    pub fn move_all(&self) -> impl Stream<Item = Result<BulkEvent>> + '_ {
        bulk::move_all(&self.mover, self.settings())
    }

    pub async fn move_all_summary(&self) -> Result<Summary> {
        bulk::move_all_summary(&self.mover, self.settings()).await
    }

    /// React to a file event.
    ///
    /// Returns `None` when the event was debounced, or when the file is gone
    /// by the time it is looked up.
    pub async fn handle(&self, event: FileEvent) -> Result<Option<MoveOutcome>> {
        if !self.debouncer.admit((event.kind(), event.path().clone())) {
            debug!(event = ?event, "Debounced file event");
            return Ok(None);
        }
        let file = match self.mover.store().stat(event.path()).await {
            Ok(file) => file,
            Err(e) if matches!(&*e, StorageErrorKind::NotFound(_) | StorageErrorKind::NotAFile(_)) => {
                debug!(event = ?event, "File event for a path that no longer holds a file");
                return Ok(None);
            },
            Err(e) => return Err(e).or_raise(|| ErrorKind::Storage),
        };
        let renamed_from = match &event {
            FileEvent::Renamed { from, .. } => Some(from),
            _ => None,
        };
        let settings = self.settings();
        self.mover.process_file(file, Caller::Auto, &settings, renamed_from).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mover::Gate;
    use crate::testing::FrontMatterPredicates;
    use futures::TryStreamExt;
    use notemover_config::{Rule, SourceFolder, TargetFolder};
    use notemover_storage::backend::MemoryStore;
    use notemover_storage::{StoreHandle, normalize};
    use tokio::time::advance;

    fn settings(trigger: Caller) -> Settings {
        Settings {
            trigger,
            rules: vec![Rule::new(SourceFolder::new("Inbox", false), TargetFolder::new("Archive"), "status = \"done\"")],
            ..Settings::default()
        }
    }

    fn triggers(store: &Arc<MemoryStore>, trigger: Caller) -> Triggers {
        let handle: StoreHandle = store.clone();
        let mover = Mover::new(Arc::clone(&handle), Arc::new(FrontMatterPredicates::new(handle)));
        Triggers::new(mover, settings(trigger))
    }

    fn store(paths: &[&str]) -> Arc<MemoryStore> {
        let store = paths
            .iter()
            .fold(MemoryStore::with_files(paths), |store, path| store.with_front_matter(path, "status", "done"));
        Arc::new(store)
    }

    #[test]
    fn test_event_path() {
        let renamed = FileEvent::Renamed {
            from: normalize("Old/a.md"),
            to: normalize("New/a.md"),
        };
        assert_eq!(renamed.path(), "New/a.md");
        assert_eq!(renamed.kind(), EventKind::Renamed);
        assert_eq!(FileEvent::Modified(normalize("a.md")).kind(), EventKind::Modified);
    }

    #[tokio::test(start_paused = true)]
    async fn test_created_file_is_moved() {
        let store = store(&["Inbox/a.md"]);
        let triggers = triggers(&store, Caller::Auto);
        let outcome = triggers.handle(FileEvent::Created(normalize("Inbox/a.md"))).await.unwrap().unwrap();
        assert!(outcome.moved);
        assert_eq!(outcome.location, "Archive/a.md");
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_debounced() {
        let store = store(&["Notes/a.md"]);
        let triggers = triggers(&store, Caller::Auto);
        let event = FileEvent::Modified(normalize("Notes/a.md"));
        assert!(triggers.handle(event.clone()).await.unwrap().is_some());
        advance(Duration::from_millis(50)).await;
        assert!(triggers.handle(event.clone()).await.unwrap().is_none());
        // A different kind of event on the same path is its own burst.
        assert!(triggers.handle(FileEvent::Created(normalize("Notes/a.md"))).await.unwrap().is_some());
        advance(crate::debounce::DEFAULT_WINDOW).await;
        assert!(triggers.handle(event).await.unwrap().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_ignored_in_command_mode() {
        let store = store(&["Inbox/a.md"]);
        let triggers = triggers(&store, Caller::Cmd);
        let outcome = triggers.handle(FileEvent::Created(normalize("Inbox/a.md"))).await.unwrap().unwrap();
        assert!(!outcome.moved);
        assert_eq!(outcome.gate, Some(Gate::ManualOnly));

        let outcome = triggers.move_file(&normalize("Inbox/a.md")).await.unwrap();
        assert!(outcome.moved);
        assert_eq!(store.paths().await, vec![normalize("Archive/a.md")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rename_keeping_name_is_ignored() {
        let store = store(&["Inbox/a.md", "Inbox/b.md"]);
        let triggers = triggers(&store, Caller::Auto);
        let moved_only = FileEvent::Renamed {
            from: normalize("Drafts/a.md"),
            to: normalize("Inbox/a.md"),
        };
        let outcome = triggers.handle(moved_only).await.unwrap().unwrap();
        assert_eq!(outcome.gate, Some(Gate::NameUnchanged));

        let renamed = FileEvent::Renamed {
            from: normalize("Inbox/old-b.md"),
            to: normalize("Inbox/b.md"),
        };
        assert!(triggers.handle(renamed).await.unwrap().unwrap().moved);
    }

    #[tokio::test(start_paused = true)]
    async fn test_vanished_file() {
        let store = store(&["Inbox/a.md"]);
        let triggers = triggers(&store, Caller::Auto);
        assert!(triggers.handle(FileEvent::Created(normalize("Inbox/gone.md"))).await.unwrap().is_none());
        assert!(triggers.handle(FileEvent::Created(normalize("Inbox"))).await.unwrap().is_none());
        let err = triggers.move_file(&normalize("Inbox/gone.md")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Storage));
    }

    #[tokio::test]
    async fn test_updated_settings_apply_to_next_pass() {
        let store = store(&["Inbox/a.md", "Inbox/b.md"]);
        let triggers = triggers(&store, Caller::Auto);
        triggers.update_settings(Settings::default());
        let events: Vec<_> = triggers.move_all().try_collect().await.unwrap();
        assert!(matches!(events.last(), Some(BulkEvent::Complete(Summary { moved: 0, .. }))));

        triggers.update_settings(settings(Caller::Cmd));
        let summary = triggers.move_all_summary().await.unwrap();
        assert_eq!(summary, Summary { processed: 2, moved: 2, skipped: 0 });
    }
}
