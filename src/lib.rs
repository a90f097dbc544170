//! WattBuddy - Smart Energy Assistant
//!
//! A retrieval-augmented conversational assistant for a home energy
//! monitor: questions are matched against a small knowledge base, the
//! matching documents condition an LLM prompt, and progress is reported
//! through a per-run placeholder.
//!
//! # Architecture
//!
//! - **knowledge**: fixed, ordered document set
//! - **rag**: retrieval, prompt composition, run state machine and the
//!   pipeline orchestrator
//! - **llm**: gateway trait and the HTTPS chat-completions client
//! - **session**: conversation store and transcript export
//! - **repl** / **cli**: terminal front-end

pub mod errors;
pub mod types;

pub mod config;
pub mod knowledge;
pub mod llm;
pub mod logging;
pub mod rag;
pub mod session;

pub mod cli;
pub mod repl;

// Re-export commonly used types
pub use errors::{AssistantError, Result};
pub use knowledge::{Document, KnowledgeBase};
pub use rag::{RagPipeline, RunOutcome};
pub use session::ConversationStore;
pub use types::{Message, Role};
