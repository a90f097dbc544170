//! Conversation state
//!
//! - Conversation: the append-only message log
//! - Persistence: transcript export to disk

pub mod conversation;
pub mod persistence;

pub use conversation::{ConversationStore, GREETING};
pub use persistence::{load_transcript, save_transcript, Transcript};
