// Keyword retrieval over the knowledge base
pub mod engine;

pub use engine::{RetrievalEngine, RetrievalResult, SearchParams};
