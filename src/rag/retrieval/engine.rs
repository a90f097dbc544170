// Keyword retrieval engine over the knowledge base
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::knowledge::{Document, KnowledgeBase};

/// Search parameters for retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchParams {
    /// Maximum number of matching documents to return
    pub top_k: usize,
    /// Content words must be strictly longer than this (in chars) to count
    pub min_word_len: usize,
    /// How many leading documents to return when nothing matches
    pub fallback_count: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_word_len: 3,
            fallback_count: 2,
        }
    }
}

/// Ranked documents selected for a query
///
/// Never empty: construction falls back to the leading knowledge-base
/// documents when no keyword matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalResult {
    documents: Vec<Document>,
    fallback: bool,
}

impl RetrievalResult {
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn ids(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// True when no document matched and the default pair was used
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }
}

/// Retrieval engine doing case-insensitive keyword containment
pub struct RetrievalEngine {
    knowledge: Arc<KnowledgeBase>,
    params: SearchParams,
}

impl RetrievalEngine {
    /// Create new retrieval engine
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self::with_params(knowledge, SearchParams::default())
    }

    /// Create with custom parameters
    pub fn with_params(knowledge: Arc<KnowledgeBase>, params: SearchParams) -> Self {
        Self { knowledge, params }
    }

    /// Retrieve documents relevant to `query`
    ///
    /// A document matches when any of its content words longer than
    /// `min_word_len` appears as a substring of the lowercased query.
    /// Matches keep knowledge-base order and are capped at `top_k`.
    pub fn retrieve(&self, query: &str) -> RetrievalResult {
        let query = query.to_lowercase();

        let matches: Vec<Document> = self
            .knowledge
            .documents()
            .iter()
            .filter(|doc| self.matches(doc, &query))
            .take(self.params.top_k.max(1))
            .cloned()
            .collect();

        if !matches.is_empty() {
            tracing::debug!(count = matches.len(), "Keyword retrieval matched documents");
            return RetrievalResult {
                documents: matches,
                fallback: false,
            };
        }

        tracing::debug!("No keyword match, using fallback documents");
        RetrievalResult {
            documents: self
                .knowledge
                .documents()
                .iter()
                .take(self.params.fallback_count.max(1))
                .cloned()
                .collect(),
            fallback: true,
        }
    }

    fn matches(&self, doc: &Document, lowered_query: &str) -> bool {
        doc.content
            .to_lowercase()
            .split_whitespace()
            .any(|word| word.chars().count() > self.params.min_word_len && lowered_query.contains(word))
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }
}
