//! Live viewer counter

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use uuid::Uuid;

/// Process-wide count of open push-channel sessions
///
/// Cloning shares the same counter. Purely observational: nothing is ever
/// refused based on the count.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    active: Arc<AtomicUsize>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently connected viewers
    pub fn current(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Record a new connection, returning the new total
    pub fn increment(&self) -> usize {
        self.active.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Record a disconnect, returning the new total (never below zero)
    pub fn decrement(&self) -> usize {
        let previous = self
            .active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
            .unwrap_or(0);
        previous.saturating_sub(1)
    }

    /// Count a viewer for as long as the returned session lives
    pub fn connect(&self, client: impl Into<String>) -> ViewerSession {
        let client = client.into();
        let id = Uuid::new_v4();
        let total = self.increment();
        tracing::info!(session = %id, "+ viewer [{}] ({} online)", client, total);

        ViewerSession {
            tracker: self.clone(),
            client,
            id,
        }
    }
}

/// One connected viewer; dropping it records the disconnect
#[derive(Debug)]
pub struct ViewerSession {
    tracker: ConnectionTracker,
    client: String,
    id: Uuid,
}

impl ViewerSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn client(&self) -> &str {
        &self.client
    }
}

impl Drop for ViewerSession {
    fn drop(&mut self) {
        let total = self.tracker.decrement();
        tracing::info!(session = %self.id, "- viewer [{}] ({} online)", self.client, total);
    }
}
