//! Refresh channel
//!
//! The modal that creates/edits/deletes usuarios is a sibling of the table,
//! not a child of it, so the mutation layer cannot call the table's refresh
//! directly. The table registers its refresh here and the mutation layer
//! invokes whatever is registered. One callback at a time; registering
//! replaces the previous one.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

/// A registered refresh callback.
pub type RefreshFn = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Single-slot refresh channel, scoped to one page session.
#[derive(Default)]
pub struct RefreshChannel {
    slot: RwLock<Option<RefreshFn>>,
}

impl RefreshChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `callback`, replacing any previous one.
    pub async fn register<F, Fut>(&self, callback: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let wrapped: RefreshFn = Arc::new(move || -> BoxFuture<'static, ()> { Box::pin(callback()) });
        *self.slot.write().await = Some(wrapped);
    }

    /// Remove the current callback (the table went away).
    pub async fn clear(&self) {
        *self.slot.write().await = None;
    }

    pub async fn is_registered(&self) -> bool {
        self.slot.read().await.is_some()
    }

    /// Run the current callback. Returns `false` when nothing is registered.
    pub async fn invoke(&self) -> bool {
        // Release the slot before awaiting so the callback may re-register.
        let callback = self.slot.read().await.clone();
        match callback {
            Some(callback) => {
                callback().await;
                true
            }
            None => {
                log::debug!("Refresh requested with no table registered");
                false
            }
        }
    }
}
