//! Per-key, leading-edge debouncing of file events.
//!
//! Hosts tend to fire several events for what the user sees as one change
//! (a create followed by a burst of modifies while the editor saves). The
//! first event of a burst gets through; the rest are dropped until the key
//! has been quiet for a full window.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Default quiet period.
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(200);

pub struct Debouncer<K> {
    window: Duration,
    last_seen: Mutex<HashMap<K, Instant>>,
}

impl<K: Eq + Hash> Debouncer<K> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Record an event for `key`. Returns `true` if it opens a new burst and
    /// should be handled, `false` if it falls inside the current one.
    ///
    /// A suppressed event still restarts the window.
    pub fn admit(&self, key: K) -> bool {
        let now = Instant::now();
        let mut last_seen = self.last_seen.lock().unwrap_or_else(PoisonError::into_inner);
        // Forget every key whose window has passed.
        last_seen.retain(|_, seen| now.duration_since(*seen) < self.window);
        last_seen.insert(key, now).is_none()
    }
}

impl<K: Eq + Hash> Default for Debouncer<K> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_leading_edge() {
        let debouncer = Debouncer::default();
        assert!(debouncer.admit("a"));
        assert!(!debouncer.admit("a"));
        advance(Duration::from_millis(199)).await;
        assert!(!debouncer.admit("a"));
        advance(DEFAULT_WINDOW).await;
        assert!(debouncer.admit("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_suppressed_events_extend_the_window() {
        let debouncer = Debouncer::new(Duration::from_millis(100));
        assert!(debouncer.admit("a"));
        for _ in 0..5 {
            advance(Duration::from_millis(60)).await;
            assert!(!debouncer.admit("a"));
        }
        advance(Duration::from_millis(100)).await;
        assert!(debouncer.admit("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let debouncer = Debouncer::default();
        assert!(debouncer.admit(("created", "a.md")));
        assert!(debouncer.admit(("modified", "a.md")));
        assert!(debouncer.admit(("created", "b.md")));
        assert!(!debouncer.admit(("created", "a.md")));
    }
}
