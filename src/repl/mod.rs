//! REPL (Read-Eval-Print Loop) module for the interactive assistant
//!
//! Reads questions, hands them to the RAG pipeline and renders the
//! placeholder events each run emits.

pub mod commands;
pub mod display;
pub mod input;

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::config::Config;
use crate::errors::AssistantError;
use crate::rag::events::{EventBus, PlaceholderEvent};
use crate::rag::{RagPipeline, RunOutcome};
use crate::repl::commands::{is_command, CommandHandler};
pub use crate::repl::display::DisplayManager;
use crate::repl::input::InputHandler;

/// REPL session coordinator
///
/// Owns the receiving end of the pipeline's event bus; queries run one at a
/// time and their events are rendered as they arrive.
pub struct ReplSession {
    input_handler: InputHandler,
    command_handler: CommandHandler,
    display_manager: DisplayManager,
    pipeline: RagPipeline,
    events: UnboundedReceiver<PlaceholderEvent>,
}

impl ReplSession {
    /// Create new REPL session
    pub fn new(pipeline: RagPipeline, events: UnboundedReceiver<PlaceholderEvent>) -> Result<Self> {
        Ok(Self::with_input(InputHandler::new()?, pipeline, events))
    }

    /// Create REPL session with persistent history
    pub fn with_history(
        history_path: PathBuf,
        pipeline: RagPipeline,
        events: UnboundedReceiver<PlaceholderEvent>,
    ) -> Result<Self> {
        Ok(Self::with_input(
            InputHandler::with_history(history_path)?,
            pipeline,
            events,
        ))
    }

    fn with_input(
        input_handler: InputHandler,
        pipeline: RagPipeline,
        events: UnboundedReceiver<PlaceholderEvent>,
    ) -> Self {
        ReplSession {
            input_handler,
            command_handler: CommandHandler::new(),
            display_manager: DisplayManager::new(),
            pipeline,
            events,
        }
    }

    /// Show the banner and the greeting, then loop until exit
    pub async fn run(&mut self, version: &str, model: &str) -> Result<()> {
        self.display_manager.show_banner(version, model);
        if let Some(greeting) = self.pipeline.conversation().last() {
            self.display_manager.show_assistant(&greeting.content);
        }

        loop {
            let line = match self.input_handler.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    self.display_manager.show_error(&e.to_string());
                    break;
                }
            };

            if !self.handle_input(&line).await? {
                break;
            }
        }

        self.save()
    }

    /// Handle user input (command or question)
    ///
    /// Returns true if session should continue, false to exit
    pub async fn handle_input(&mut self, input: &str) -> Result<bool> {
        if input.trim().is_empty() {
            return Ok(true);
        }

        if is_command(input) {
            let command = self.command_handler.parse(input);
            return self
                .command_handler
                .execute(command, &self.pipeline, &self.display_manager);
        }

        self.ask(input).await;
        Ok(true)
    }

    /// Run one question to completion, rendering its progress
    pub async fn ask(&mut self, query: &str) -> Option<RunOutcome> {
        match run_query(
            &self.pipeline,
            &mut self.events,
            &mut self.display_manager,
            query,
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Query failed: {:#}", e);
                self.display_manager.show_error(&e.to_string());
                None
            }
        }
    }

    /// Save session state
    pub fn save(&mut self) -> Result<()> {
        self.input_handler.save_history()?;
        Ok(())
    }
}

/// Answer a single question without the REPL
///
/// Blank input is ignored before the pipeline is built and yields
/// `Ok(None)`.
pub async fn ask_once(config: &Config, query: &str) -> Result<Option<RunOutcome>> {
    if query.trim().is_empty() {
        tracing::debug!("Ignoring empty query");
        return Ok(None);
    }

    let mut config = config.clone();
    config.pipeline.greeting = false;

    let (bus, mut events) = EventBus::new();
    let pipeline = RagPipeline::from_config(&config, Arc::new(bus))?;
    let mut display = DisplayManager::new();
    run_query(&pipeline, &mut events, &mut display, query).await
}

/// Submit `query`, render its events until finalized and return the outcome
///
/// `EmptyQuery` is swallowed as `Ok(None)`.
async fn run_query(
    pipeline: &RagPipeline,
    events: &mut UnboundedReceiver<PlaceholderEvent>,
    display: &mut DisplayManager,
    query: &str,
) -> Result<Option<RunOutcome>> {
    let run = match pipeline.submit_query(query) {
        Ok(run) => run,
        Err(AssistantError::EmptyQuery) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let id = run.id();
    let handle = tokio::spawn(run.execute());
    display.follow_run(events, id).await;
    Ok(Some(handle.await?))
}
