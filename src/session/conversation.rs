//! Append-only conversation log
//!
//! Shared by the orchestrator (commits) and the front-end (reads). Appends
//! from concurrent runs are serialized by the lock, so the log is ordered by
//! commit time and nothing is ever lost or deduplicated.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::types::Message;

/// Opening assistant message shown before the first question
pub const GREETING: &str = "Hello! I am your Energy Assistant. Ask me how to optimize your consumption.";

/// Cloneable handle to one conversation
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl ConversationStore {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a conversation seeded with the assistant greeting
    pub fn with_greeting() -> Self {
        let store = Self::new();
        store.append(Message::assistant(GREETING));
        store
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        // Appends never leave the vector half-written, so a poisoned lock is still usable
        self.messages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Commit a message at the end of the log
    pub fn append(&self, message: Message) {
        let mut messages = self.lock();
        messages.push(message);
        tracing::trace!(len = messages.len(), "Conversation message committed");
    }

    /// Snapshot of every message in commit order
    pub fn all(&self) -> Vec<Message> {
        self.lock().clone()
    }

    /// Get the last N messages
    pub fn last_n(&self, n: usize) -> Vec<Message> {
        let messages = self.lock();
        let start = messages.len().saturating_sub(n);
        messages[start..].to_vec()
    }

    /// Get the most recent message
    pub fn last(&self) -> Option<Message> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
