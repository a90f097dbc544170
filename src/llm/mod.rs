//! LLM gateway module
//!
//! Provides the generation trait and the HTTPS chat-completions client.

pub mod client;

// Re-export commonly used types
pub use client::{extract_completion, ChatCompletionsClient, LlmGateway};
