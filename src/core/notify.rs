//! Document update notifications.
//!
//! Observers (a realtime socket, a cache, a test) subscribe to a broadcast channel
//! and receive one [`DocUpdate`] each time a hook changes a stored document.

use crate::entities::document;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 64;

/// A stored document changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocUpdate {
    pub doctype: String,
    pub name: String,
    /// `modified` timestamp after the change
    pub modified: DateTime<Utc>,
}

/// Fan-out of document updates to any number of observers.
#[derive(Debug, Clone)]
pub struct Notifier {
    sender: broadcast::Sender<DocUpdate>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Notifier {
    /// Creates a notifier that buffers up to `capacity` updates per slow observer.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Registers a new observer.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DocUpdate> {
        self.sender.subscribe()
    }

    /// Tells every observer that `doc` was updated. Having no observers is fine.
    pub fn notify_update(&self, doc: &document::Model) {
        let update = DocUpdate {
            doctype: doc.doctype.clone(),
            name: doc.name.clone(),
            modified: doc.modified,
        };

        match self.sender.send(update) {
            Ok(receivers) => {
                tracing::debug!(doctype = %doc.doctype, name = %doc.name, receivers, "Notified document update");
            }
            Err(_) => {
                tracing::trace!(doctype = %doc.doctype, name = %doc.name, "No observers for document update");
            }
        }
    }
}
