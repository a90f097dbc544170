//! Placeholder events from the pipeline to the UI
//!
//! The orchestrator never touches rendering. It reports the lifecycle of each
//! run's placeholder through `PlaceholderSink`, keyed by the run's
//! `CorrelationId`.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Per-run token linking progress updates to one placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ai-response-{}", self.0)
    }
}

/// Receiver of placeholder lifecycle callbacks
///
/// `on_placeholder_finalized` is called exactly once per run, after any
/// number of updates.
pub trait PlaceholderSink: Send + Sync {
    fn on_placeholder_created(&self, id: CorrelationId, content: &str);
    fn on_placeholder_updated(&self, id: CorrelationId, content: &str);
    fn on_placeholder_finalized(&self, id: CorrelationId, content: &str);
}

/// Placeholder lifecycle event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderEvent {
    Created { id: CorrelationId, content: String },
    Updated { id: CorrelationId, content: String },
    Finalized { id: CorrelationId, content: String },
}

impl PlaceholderEvent {
    pub fn id(&self) -> CorrelationId {
        match self {
            PlaceholderEvent::Created { id, .. }
            | PlaceholderEvent::Updated { id, .. }
            | PlaceholderEvent::Finalized { id, .. } => *id,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            PlaceholderEvent::Created { content, .. }
            | PlaceholderEvent::Updated { content, .. }
            | PlaceholderEvent::Finalized { content, .. } => content,
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, PlaceholderEvent::Finalized { .. })
    }
}

/// Event bus forwarding placeholder events to a UI task
///
/// Unbounded; emitting never blocks and never drops an event while the
/// receiver is alive.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: mpsc::UnboundedSender<PlaceholderEvent>,
}

impl EventBus {
    /// Create new event bus and its receiving end
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PlaceholderEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (EventBus { sender }, receiver)
    }

    /// Emit an event; a closed receiver only loses display, not state
    pub fn emit(&self, event: PlaceholderEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("Placeholder event dropped, receiver closed");
        }
    }
}

impl PlaceholderSink for EventBus {
    fn on_placeholder_created(&self, id: CorrelationId, content: &str) {
        self.emit(PlaceholderEvent::Created {
            id,
            content: content.to_string(),
        });
    }

    fn on_placeholder_updated(&self, id: CorrelationId, content: &str) {
        self.emit(PlaceholderEvent::Updated {
            id,
            content: content.to_string(),
        });
    }

    fn on_placeholder_finalized(&self, id: CorrelationId, content: &str) {
        self.emit(PlaceholderEvent::Finalized {
            id,
            content: content.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_ids_are_unique() {
        let a = CorrelationId::new();
        let b = CorrelationId::new();
        assert_ne!(a, b);
        assert!(a.to_string().starts_with("ai-response-"));
    }

    #[tokio::test]
    async fn test_sink_callbacks_become_events_in_order() {
        let (bus, mut receiver) = EventBus::new();
        let id = CorrelationId::new();

        bus.on_placeholder_created(id, "init");
        bus.on_placeholder_updated(id, "step");
        bus.on_placeholder_finalized(id, "done");

        let first = receiver.recv().await.unwrap();
        assert_eq!(
            first,
            PlaceholderEvent::Created {
                id,
                content: "init".to_string()
            }
        );
        assert_eq!(receiver.recv().await.unwrap().content(), "step");

        let last = receiver.recv().await.unwrap();
        assert!(last.is_final());
        assert_eq!(last.id(), id);
    }

    #[tokio::test]
    async fn test_event_bus_clone_shares_channel() {
        let (bus1, mut receiver) = EventBus::new();
        let bus2 = bus1.clone();

        bus1.on_placeholder_created(CorrelationId::new(), "from bus1");
        bus2.on_placeholder_created(CorrelationId::new(), "from bus2");

        assert_eq!(receiver.recv().await.unwrap().content(), "from bus1");
        assert_eq!(receiver.recv().await.unwrap().content(), "from bus2");
    }

    #[test]
    fn test_emit_after_receiver_dropped_does_not_panic() {
        let (bus, receiver) = EventBus::new();
        drop(receiver);
        bus.on_placeholder_finalized(CorrelationId::new(), "lost");
    }

    #[tokio::test]
    async fn test_many_events_are_not_dropped() {
        let (bus, mut receiver) = EventBus::new();
        let id = CorrelationId::new();
        for i in 0..500 {
            bus.on_placeholder_updated(id, &format!("update {}", i));
        }
        drop(bus);

        let mut count = 0;
        while receiver.recv().await.is_some() {
            count += 1;
        }
        assert_eq!(count, 500);
    }
}
