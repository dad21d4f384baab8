// SPDX-License-Identifier: MIT
//! Host-facing event notifications.
//!
//! The library never renders UI; anything a popup or setup page would react
//! to (status changes, update availability) is published here as a JSON
//! envelope and the host decides what to do with it.

use serde_json::Value;
use tokio::sync::broadcast;

/// Broadcasts JSON event envelopes to every subscribed host listener.
#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<String>,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBroadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    /// Publish an event to all subscribers.
    pub fn broadcast(&self, event: &str, data: Value) {
        let envelope = serde_json::json!({
            "event": event,
            "data": data,
        });
        // Ignore errors — no subscribers is fine
        let _ = self
            .tx
            .send(serde_json::to_string(&envelope).unwrap_or_default());
    }

    /// Subscribe to all broadcast events.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}
