//! Keystroke debouncing

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Default wait before a typed search is committed.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Trailing-edge debouncer.
///
/// Every call to [`settle`](Self::settle) supersedes the previous ones; only
/// the call whose wait elapses without a newer call returns its value.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    generation: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: AtomicU64::new(0),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait out the delay; `Some(value)` if nothing newer arrived meanwhile.
    pub async fn settle<T>(&self, value: T) -> Option<T> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        (self.generation.load(Ordering::SeqCst) == ticket).then_some(value)
    }

    /// Drop whatever is pending.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}
