//! Moving every file in the store at once.

use crate::error::{ErrorKind, Result};
use crate::mover::Mover;
use async_stream::stream;
use exn::ResultExt;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt, TryStreamExt};
use notemover_asyncutils::TaskPool;
use notemover_config::{Caller, Settings};
use notemover_storage::NormalizedPath;
use std::sync::Arc;
use tracing::{info, warn};

/// How many files a bulk move processes at the same time.
pub const BULK_CONCURRENCY: usize = 5;

/// Counts of a finished bulk move. Every processed file is either moved or
/// skipped; files that failed count as skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub processed: usize,
    pub moved: usize,
    pub skipped: usize,
}
impl Summary {
    fn record(&mut self, moved: bool) {
        self.processed += 1;
        match moved {
            true => self.moved += 1,
            false => self.skipped += 1,
        }
    }
}

/// Progress events emitted by [`move_all`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started), exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete), exactly once, with the
///    total file count.
/// 3. [`Processed`](Self::Processed), once per file, in completion order.
/// 4. [`Complete`](Self::Complete), exactly once, with the final counts.
///
/// Only a failure to list the store ends the stream early (with an `Err`).
#[derive(Debug)]
pub enum BulkEvent {
    Started,
    DiscoveryComplete(u64),
    Processed { path: NormalizedPath, moved: bool },
    Complete(Summary),
}

/// Streams [`BulkEvent`]s while running every file in the store through
/// [`Mover::process_file`] as a command, [`BULK_CONCURRENCY`] files at a
/// time.
///
/// A file that cannot be processed (predicate failure, task abandoned) is
/// logged and counted as skipped; it does not stop the others.
pub fn move_all<'a>(mover: &'a Mover, settings: Arc<Settings>) -> impl Stream<Item = Result<BulkEvent>> + 'a {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        yield Ok(BulkEvent::Started);

        let files = match mover.store().list().await.or_raise(|| ErrorKind::Storage) {
            Ok(f) => f,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        // Infallible: a usize (either 32- or 64-bit) will always fit in a u64.
        yield Ok(BulkEvent::DiscoveryComplete(u64::try_from(files.len()).unwrap_or(0)));

        let pool = TaskPool::new(BULK_CONCURRENCY);
        let mut processing: FuturesUnordered<_> = files
            .into_iter()
            .map(|file| {
                let path = file.path.clone();
                let mover = mover.clone();
                let settings = Arc::clone(&settings);
                let task = pool.submit(move || async move { mover.process_file(file, Caller::Cmd, &settings, None).await });
                async move { (path, task.await) }
            })
            .collect();

        let mut summary = Summary::default();
        while let Some((path, result)) = processing.next().await {
            let moved = match result {
                Ok(Ok(outcome)) => outcome.moved,
                Ok(Err(e)) => {
                    warn!(file = %path, error = ?e, "Could not process file");
                    false
                },
                Err(e) => {
                    warn!(file = %path, error = ?e, "File was never processed");
                    false
                },
            };
            summary.record(moved);
            yield Ok(BulkEvent::Processed { path, moved });
        }

        info!(processed = summary.processed, moved = summary.moved, skipped = summary.skipped, "Bulk move complete");
        yield Ok(BulkEvent::Complete(summary));
    })
}

/// Run [`move_all`] to completion and return its [`Summary`].
pub async fn move_all_summary(mover: &Mover, settings: Arc<Settings>) -> Result<Summary> {
    let mut events = std::pin::pin!(move_all(mover, settings));
    let mut summary = Summary::default();
    while let Some(event) = events.try_next().await? {
        if let BulkEvent::Complete(complete) = event {
            summary = complete;
        }
    }
    Ok(summary)
}
