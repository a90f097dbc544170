// RAG (Retrieval-Augmented Generation) pipeline
//
// Answers energy questions by retrieving knowledge-base documents and
// conditioning the LLM on them.
//
// Components:
// - Retrieval Engine: keyword containment over the knowledge base
// - Prompt Composer: system instruction around the retrieved context
// - State: per-run state machine
// - Events: placeholder callbacks towards the UI
// - Pipeline: end-to-end orchestration

pub mod context;
pub mod events;
pub mod pipeline;
pub mod progress;
pub mod retrieval;
pub mod state;

// Re-export key types
pub use context::{ComposedPrompt, PromptComposer};
pub use events::{CorrelationId, EventBus, PlaceholderEvent, PlaceholderSink};
pub use pipeline::{PipelineRun, RagPipeline, RunOutcome};
pub use retrieval::{RetrievalEngine, RetrievalResult, SearchParams};
pub use state::{RunEvent, RunState};
