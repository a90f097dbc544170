// Conversation transcript export
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::session::conversation::ConversationStore;
use crate::types::Message;

/// Transcript file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub exported_at: DateTime<Utc>,
    pub messages: Vec<Message>,
}

impl Transcript {
    /// Snapshot the conversation as of now
    pub fn capture(store: &ConversationStore) -> Self {
        Self {
            exported_at: Utc::now(),
            messages: store.all(),
        }
    }
}

/// Write the conversation to `path` as pretty JSON
pub fn save_transcript(store: &ConversationStore, path: &Path) -> Result<Transcript> {
    let transcript = Transcript::capture(store);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("Failed to create transcript directory")?;
        }
    }

    let json = serde_json::to_string_pretty(&transcript).context("Failed to serialize transcript")?;

    fs::write(path, json)
        .with_context(|| format!("Failed to write transcript file {}", path.display()))?;

    Ok(transcript)
}

/// Read a transcript previously written by `save_transcript`
pub fn load_transcript(path: &Path) -> Result<Transcript> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read transcript file {}", path.display()))?;

    serde_json::from_str(&json).context("Failed to deserialize transcript")
}
