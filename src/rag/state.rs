//! Pipeline run state machine
//!
//! Each submitted query walks a deterministic path:
//! - Started → Analyzing → Retrieving → Generating → Completed
//! - Failed is reachable from every non-terminal state
//! - Completed and Failed are terminal and absorb further events

use crate::errors::{AssistantError, Result};
use serde::{Deserialize, Serialize};

/// Pipeline run states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunState {
    /// Placeholder created, nothing processed yet
    Started,

    /// Cosmetic query interpretation step
    Analyzing,

    /// Knowledge base lookup
    Retrieving,

    /// Prompt composed, waiting on the LLM service
    Generating,

    /// Answer committed (terminal)
    Completed,

    /// Run ended with an error shown to the user (terminal)
    Failed,
}

/// Events that trigger run state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    BeginAnalysis,
    BeginRetrieval,
    BeginGeneration,
    AnswerReady,
    Fail,
}

impl RunState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed)
    }

    /// Attempt state transition with validation
    ///
    /// Valid transitions:
    /// 1. Started    → Analyzing   (on: BeginAnalysis)
    /// 2. Analyzing  → Retrieving  (on: BeginRetrieval)
    /// 3. Retrieving → Generating  (on: BeginGeneration)
    /// 4. Generating → Completed   (on: AnswerReady)
    /// 5. non-terminal → Failed    (on: Fail)
    /// 6. Completed/Failed self-loop
    pub fn transition(&self, event: RunEvent) -> Result<RunState> {
        use RunEvent::*;
        use RunState::*;

        let next = match (self, event) {
            (Completed, _) => Completed,
            (Failed, _) => Failed,

            (_, Fail) => Failed,

            (Started, BeginAnalysis) => Analyzing,
            (Analyzing, BeginRetrieval) => Retrieving,
            (Retrieving, BeginGeneration) => Generating,
            (Generating, AnswerReady) => Completed,

            (from, event) => {
                return Err(AssistantError::InvalidTransition {
                    from: format!("{:?}", from),
                    to: format!("(via {:?})", event),
                    reason: format!("No valid transition from {:?} on {:?}", from, event),
                });
            }
        };

        Ok(next)
    }

    /// Human-readable state name
    pub fn display_name(&self) -> &'static str {
        match self {
            RunState::Started => "Initializing",
            RunState::Analyzing => "Intent Analysis",
            RunState::Retrieving => "Retrieval",
            RunState::Generating => "Generating",
            RunState::Completed => "Completed",
            RunState::Failed => "Failed",
        }
    }
}
