//! Input handler for REPL using rustyline
//!
//! Line editing with optional persistent history.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::History;
use rustyline::DefaultEditor;
use std::path::PathBuf;

pub const DEFAULT_PROMPT: &str = ">wattbuddy: ";

/// Input handler managing readline interface and command history
pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
}

impl InputHandler {
    /// Create new input handler
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()?;

        Ok(InputHandler {
            editor,
            history_path: None,
        })
    }

    /// Create input handler with persistent history
    pub fn with_history(history_file: PathBuf) -> Result<Self> {
        let mut editor = DefaultEditor::new()?;

        if history_file.exists() {
            let _ = editor.load_history(&history_file);
        }

        Ok(InputHandler {
            editor,
            history_path: Some(history_file),
        })
    }

    /// Read a line of input from user
    ///
    /// Returns:
    /// - Ok(Some(input)) for normal input (empty string for a blank line)
    /// - Ok(None) for EOF (Ctrl-D) or interrupt (Ctrl-C)
    /// - Err on other readline errors
    pub fn read_line(&mut self) -> Result<Option<String>> {
        match self.editor.readline(DEFAULT_PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed.is_empty() {
                    return Ok(Some(String::new()));
                }

                let _ = self.editor.add_history_entry(trimmed);

                Ok(Some(trimmed.to_string()))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }

    /// Save history to disk
    pub fn save_history(&mut self) -> Result<()> {
        if let Some(ref path) = self.history_path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            self.editor.save_history(path)?;
        }
        Ok(())
    }

    /// Get history size
    pub fn history_len(&self) -> usize {
        self.editor.history().len()
    }
}
