// End-to-end RAG pipeline orchestration
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::config::{Config, PipelineConfig};
use crate::errors::{AssistantError, Result};
use crate::knowledge::KnowledgeBase;
use crate::llm::{ChatCompletionsClient, LlmGateway};
use crate::rag::context::PromptComposer;
use crate::rag::events::{CorrelationId, PlaceholderSink};
use crate::rag::progress;
use crate::rag::retrieval::RetrievalEngine;
use crate::rag::state::{RunEvent, RunState};
use crate::session::ConversationStore;
use crate::types::Message;

/// Terminal result of one pipeline run
#[derive(Debug)]
pub enum RunOutcome {
    /// Answer committed to the conversation
    Completed {
        id: CorrelationId,
        content: String,
        sources: Vec<String>,
    },
    /// Error shown in the placeholder, nothing committed
    Failed {
        id: CorrelationId,
        error: AssistantError,
    },
}

impl RunOutcome {
    pub fn id(&self) -> CorrelationId {
        match self {
            RunOutcome::Completed { id, .. } | RunOutcome::Failed { id, .. } => *id,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }

    /// Committed answer, if the run completed
    pub fn content(&self) -> Option<&str> {
        match self {
            RunOutcome::Completed { content, .. } => Some(content),
            RunOutcome::Failed { .. } => None,
        }
    }
}

struct PipelineInner {
    retrieval: RetrievalEngine,
    composer: PromptComposer,
    gateway: Arc<dyn LlmGateway>,
    conversation: ConversationStore,
    sink: Arc<dyn PlaceholderSink>,
    config: PipelineConfig,
}

/// RAG pipeline orchestrator
///
/// Cheap to clone; every clone drives runs against the same knowledge base,
/// gateway, conversation and sink.
#[derive(Clone)]
pub struct RagPipeline {
    inner: Arc<PipelineInner>,
}

impl RagPipeline {
    /// Create pipeline from injected collaborators
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        gateway: Arc<dyn LlmGateway>,
        conversation: ConversationStore,
        sink: Arc<dyn PlaceholderSink>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                retrieval: RetrievalEngine::new(knowledge),
                composer: PromptComposer::new(),
                gateway,
                conversation,
                sink,
                config,
            }),
        }
    }

    /// Build the production pipeline: configured knowledge base, HTTPS
    /// gateway and a fresh conversation
    pub fn from_config(config: &Config, sink: Arc<dyn PlaceholderSink>) -> Result<Self> {
        let knowledge = match &config.knowledge.path {
            Some(path) => KnowledgeBase::from_file(path)?,
            None => KnowledgeBase::builtin(),
        };

        let gateway = ChatCompletionsClient::from_config(&config.llm)?;

        let conversation = if config.pipeline.greeting {
            ConversationStore::with_greeting()
        } else {
            ConversationStore::new()
        };

        Ok(Self::new(
            Arc::new(knowledge),
            Arc::new(gateway),
            conversation,
            sink,
            config.pipeline.clone(),
        ))
    }

    /// Accept a query and prepare its run
    ///
    /// Blank text returns `EmptyQuery` and changes nothing. Otherwise the
    /// user message is committed and the run's placeholder created before
    /// this returns.
    pub fn submit_query(&self, text: &str) -> Result<PipelineRun> {
        let query = text.trim();
        if query.is_empty() {
            tracing::debug!("Ignoring empty query");
            return Err(AssistantError::EmptyQuery);
        }

        self.inner.conversation.append(Message::user(query));

        let id = CorrelationId::new();
        self.inner
            .sink
            .on_placeholder_created(id, &progress::initializing());
        tracing::info!(run = %id, "Pipeline run started");

        Ok(PipelineRun {
            id,
            query: query.to_string(),
            state: RunState::Started,
            inner: Arc::clone(&self.inner),
        })
    }

    /// Submit a query and drive its run on a spawned task
    pub fn spawn_query(&self, text: &str) -> Result<JoinHandle<RunOutcome>> {
        let run = self.submit_query(text)?;
        Ok(tokio::spawn(run.execute()))
    }

    /// Conversation shared with this pipeline
    pub fn conversation(&self) -> &ConversationStore {
        &self.inner.conversation
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        self.inner.retrieval.knowledge()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.inner.config
    }
}

/// One in-flight query
pub struct PipelineRun {
    id: CorrelationId,
    query: String,
    state: RunState,
    inner: Arc<PipelineInner>,
}

impl PipelineRun {
    pub fn id(&self) -> CorrelationId {
        self.id
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run to a terminal state
    ///
    /// Every error is caught here: the placeholder is finalized with the
    /// error message and nothing is committed to the conversation.
    pub async fn execute(mut self) -> RunOutcome {
        match self.drive().await {
            Ok((content, sources)) => {
                tracing::info!(run = %self.id, sources = sources.len(), "Pipeline run completed");
                RunOutcome::Completed {
                    id: self.id,
                    content,
                    sources,
                }
            }
            Err(error) => {
                self.state = self
                    .state
                    .transition(RunEvent::Fail)
                    .unwrap_or(RunState::Failed);
                tracing::error!(run = %self.id, error = %error, "Pipeline run failed");
                self.inner
                    .sink
                    .on_placeholder_finalized(self.id, progress::ERROR_MESSAGE);
                RunOutcome::Failed { id: self.id, error }
            }
        }
    }

    async fn drive(&mut self) -> Result<(String, Vec<String>)> {
        let inner = Arc::clone(&self.inner);

        self.advance(RunEvent::BeginAnalysis)?;
        pause(inner.config.analyze_delay()).await;
        inner
            .sink
            .on_placeholder_updated(self.id, &progress::analyzing());

        self.advance(RunEvent::BeginRetrieval)?;
        pause(inner.config.retrieve_delay()).await;
        let retrieved = inner.retrieval.retrieve(&self.query);
        tracing::debug!(run = %self.id, documents = ?retrieved.ids(), fallback = retrieved.is_fallback(), "Retrieved context");
        inner
            .sink
            .on_placeholder_updated(self.id, &progress::retrieved(&retrieved));

        self.advance(RunEvent::BeginGeneration)?;
        let prompt = inner.composer.compose(&self.query, retrieved.documents());
        let text = inner
            .gateway
            .generate(&prompt.system_prompt, &prompt.user_query)
            .await?;

        let content = progress::format_response(&text, retrieved.len());
        self.advance(RunEvent::AnswerReady)?;
        inner.conversation.append(Message::assistant(content.clone()));
        inner.sink.on_placeholder_finalized(self.id, &content);

        let sources = retrieved.ids().into_iter().map(str::to_string).collect();
        Ok((content, sources))
    }

    fn advance(&mut self, event: RunEvent) -> Result<()> {
        let next = self.state.transition(event)?;
        tracing::debug!(run = %self.id, "[STATE] {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
