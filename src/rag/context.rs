// Prompt composer for RAG-augmented requests
use serde::{Deserialize, Serialize};

use crate::knowledge::Document;

/// System prompt plus the untouched user query, ready for the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedPrompt {
    pub system_prompt: String,
    pub user_query: String,
}

/// Builds the assistant's system instruction around retrieved context
#[derive(Debug, Clone, Default)]
pub struct PromptComposer;

impl PromptComposer {
    pub fn new() -> Self {
        Self
    }

    /// One context line per document, each prefixed with `- `
    pub fn context_block(&self, documents: &[Document]) -> String {
        documents
            .iter()
            .map(|doc| format!("- {}", doc.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Compose the system prompt for `query` from `documents`
    pub fn compose(&self, query: &str, documents: &[Document]) -> ComposedPrompt {
        let context = self.context_block(documents);

        let system_prompt = format!(
            r#"You are an advanced Smart Energy Assistant. Use the provided Context to answer the user's question.

Context:
{}

If the context doesn't have the answer, use general energy-saving knowledge.
Keep answers concise, helpful, and professional. Use HTML formatting (<b>, <ul>, <li>) for readability."#,
            context
        );

        ComposedPrompt {
            system_prompt,
            user_query: query.to_string(),
        }
    }
}
