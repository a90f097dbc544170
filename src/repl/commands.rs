//! Command handler for REPL built-in commands

use anyhow::Result;
use colored::*;
use std::path::PathBuf;

use crate::rag::RagPipeline;
use crate::repl::display::DisplayManager;
use crate::session::{load_transcript, save_transcript};

/// REPL command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    History { limit: Option<usize> },
    Sources,
    Save { path: Option<PathBuf> },
    Load { path: Option<PathBuf> },
    Clear,
    Exit,
    Unknown { input: String },
}

/// Whether the input is a `/command` rather than a question
pub fn is_command(input: &str) -> bool {
    input.trim_start().starts_with('/')
}

/// Command handler for parsing and executing REPL commands
#[derive(Debug, Default)]
pub struct CommandHandler;

impl CommandHandler {
    /// Create new command handler
    pub fn new() -> Self {
        CommandHandler
    }

    /// Parse input string into a command
    pub fn parse(&self, input: &str) -> Command {
        let trimmed = input.trim();

        if !trimmed.starts_with('/') {
            return Command::Unknown {
                input: input.to_string(),
            };
        }

        let parts: Vec<&str> = trimmed[1..].split_whitespace().collect();
        if parts.is_empty() {
            return Command::Unknown {
                input: input.to_string(),
            };
        }

        match parts[0].to_lowercase().as_str() {
            "help" | "h" => Command::Help,
            "exit" | "quit" | "q" => Command::Exit,
            "history" => {
                let limit = parts.get(1).and_then(|s| s.parse().ok());
                Command::History { limit }
            }
            "sources" | "kb" => Command::Sources,
            "save" => Command::Save {
                path: parts.get(1).map(PathBuf::from),
            },
            "load" => Command::Load {
                path: parts.get(1).map(PathBuf::from),
            },
            "clear" | "cls" => Command::Clear,
            _ => Command::Unknown {
                input: input.to_string(),
            },
        }
    }

    /// Execute a command
    ///
    /// Returns true if REPL should continue, false if should exit
    pub fn execute(
        &mut self,
        command: Command,
        pipeline: &RagPipeline,
        display: &DisplayManager,
    ) -> Result<bool> {
        match command {
            Command::Help => {
                self.show_help();
                Ok(true)
            }
            Command::Exit => {
                println!("{}", "Goodbye!".green());
                Ok(false)
            }
            Command::History { limit } => {
                let messages = match limit {
                    Some(n) => pipeline.conversation().last_n(n),
                    None => pipeline.conversation().all(),
                };
                display.show_history(&messages);
                Ok(true)
            }
            Command::Sources => {
                display.show_sources(pipeline.knowledge());
                Ok(true)
            }
            Command::Save { path } => {
                let path = path.unwrap_or_else(|| PathBuf::from("wattbuddy-transcript.json"));
                match save_transcript(pipeline.conversation(), &path) {
                    Ok(transcript) => display.show_info(&format!(
                        "Saved {} messages to {}",
                        transcript.messages.len(),
                        path.display()
                    )),
                    Err(e) => display.show_error(&format!("{:#}", e)),
                }
                Ok(true)
            }
            Command::Load { path: None } => {
                display.show_error("Usage: /load <path>");
                Ok(true)
            }
            Command::Load { path: Some(path) } => {
                match load_transcript(&path) {
                    Ok(transcript) => {
                        display.show_info(&format!(
                            "Transcript {} (exported {})",
                            path.display(),
                            transcript.exported_at.format("%Y-%m-%d %H:%M:%S UTC")
                        ));
                        display.show_history(&transcript.messages);
                    }
                    Err(e) => display.show_error(&format!("{:#}", e)),
                }
                Ok(true)
            }
            Command::Clear => {
                display.clear_screen()?;
                Ok(true)
            }
            Command::Unknown { input } => {
                println!("{}", format!("Unknown command: {}", input).red());
                println!("Type {} for available commands", "/help".cyan());
                Ok(true)
            }
        }
    }

    /// Display help information
    fn show_help(&self) {
        println!("\n{}", "Available Commands:".bold().cyan());
        println!("{}", "=".repeat(60).cyan());

        let commands = vec![
            ("/help, /h", "Show this help message"),
            ("/history [n]", "Show the conversation (last n messages)"),
            ("/sources, /kb", "List knowledge base documents"),
            ("/save [path]", "Save the conversation as JSON"),
            ("/load <path>", "Show a saved transcript"),
            ("/clear, /cls", "Clear screen"),
            ("/exit, /quit, /q", "Exit REPL"),
        ];

        for (cmd, desc) in commands {
            println!("  {:<20} {}", cmd.green(), desc);
        }

        println!("\n{}", "Usage:".bold());
        println!("  - Type your question directly (no / prefix)");
        println!("  - Use {} for input history", "UP/DOWN arrows".cyan());
        println!("  - Press {} or {} to exit", "Ctrl-D".cyan(), "/exit".cyan());
        println!();
    }
}
