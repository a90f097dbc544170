//! Display manager for the terminal front-end
//!
//! Renders placeholder events as spinners and assistant markup as plain
//! terminal text.

use colored::*;
use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::io;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::knowledge::KnowledgeBase;
use crate::rag::events::{CorrelationId, PlaceholderEvent};
use crate::types::{Message, Role};

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static markup pattern"))
}

/// Convert the assistant's HTML subset into terminal text
///
/// `<br>` and block ends become newlines, list items become bullets,
/// `<b>`/`<strong>` become bold, every other tag is dropped.
pub fn render_markup(markup: &str) -> String {
    render(markup, true)
}

/// Same as `render_markup` without terminal styling
pub fn plain_text(markup: &str) -> String {
    render(markup, false)
}

fn render(markup: &str, styled: bool) -> String {
    static BREAK: OnceLock<Regex> = OnceLock::new();
    static BLOCK_END: OnceLock<Regex> = OnceLock::new();
    static ITEM: OnceLock<Regex> = OnceLock::new();
    static BOLD: OnceLock<Regex> = OnceLock::new();
    static TAG: OnceLock<Regex> = OnceLock::new();

    let text = markup.replace('\n', "");
    let text = cached(&BREAK, r"(?i)<br\s*/?>").replace_all(&text, "\n");
    let text = cached(&BLOCK_END, r"(?i)</(div|ul|ol|p|li)>").replace_all(&text, "\n");
    let text = cached(&ITEM, r"(?i)<li[^>]*>").replace_all(&text, "  • ");
    let text = cached(&BOLD, r"(?is)<(b|strong)>(.*?)</(?:b|strong)>")
        .replace_all(&text, |caps: &Captures| {
            if styled {
                caps[2].bold().to_string()
            } else {
                caps[2].to_string()
            }
        });
    let text = cached(&TAG, r"<[^>]*>").replace_all(&text, "");

    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() && lines.last().map_or(true, |l| l.trim().is_empty()) {
            continue;
        }
        lines.push(line);
    }
    lines.join("\n").trim_end().to_string()
}

/// Single-line form of rendered markup, for spinner messages
pub fn summarize_markup(markup: &str) -> String {
    plain_text(markup)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Display manager for REPL UI
pub struct DisplayManager {
    multi_progress: MultiProgress,
    placeholders: HashMap<CorrelationId, ProgressBar>,
    update_interval: Duration,
}

impl DisplayManager {
    /// Create new display manager
    pub fn new() -> Self {
        DisplayManager {
            multi_progress: MultiProgress::new(),
            placeholders: HashMap::new(),
            update_interval: Duration::from_millis(100),
        }
    }

    /// Show welcome banner
    pub fn show_banner(&self, version: &str, model: &str) {
        let width = 64;
        let title = format!("  WattBuddy {} - Smart Energy Assistant", version);
        let info = format!("  Model: {} | Mode: REPL", model);

        println!("\n{}", "=".repeat(width).cyan());
        println!("{}", title.bold().cyan());
        println!("{}", info.dimmed());
        println!("{}\n", "=".repeat(width).cyan());
        println!(
            "Ask about your energy usage (or {} for commands, {} to quit)\n",
            "/help".green(),
            "/exit".green()
        );
    }

    /// Apply one placeholder event; returns true when it finalized a placeholder
    pub fn handle_event(&mut self, event: &PlaceholderEvent) -> bool {
        match event {
            PlaceholderEvent::Created { id, content } => {
                let pb = self.multi_progress.add(ProgressBar::new_spinner());
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.cyan} {msg}")
                        .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb.set_message(summarize_markup(content));
                pb.enable_steady_tick(self.update_interval);
                self.placeholders.insert(*id, pb);
                false
            }
            PlaceholderEvent::Updated { id, content } => {
                if let Some(pb) = self.placeholders.get(id) {
                    pb.set_message(summarize_markup(content));
                }
                false
            }
            PlaceholderEvent::Finalized { id, content } => {
                if let Some(pb) = self.placeholders.remove(id) {
                    pb.finish_and_clear();
                }
                self.show_assistant(content);
                true
            }
        }
    }

    /// Render events until the placeholder `id` is finalized
    ///
    /// Returns false if the channel closed first.
    pub async fn follow_run(
        &mut self,
        events: &mut UnboundedReceiver<PlaceholderEvent>,
        id: CorrelationId,
    ) -> bool {
        while let Some(event) = events.recv().await {
            let finalized = self.handle_event(&event);
            if finalized && event.id() == id {
                return true;
            }
        }
        false
    }

    /// Number of placeholders still in progress
    pub fn active_placeholders(&self) -> usize {
        self.placeholders.len()
    }

    /// Display an assistant bubble
    pub fn show_assistant(&self, markup: &str) {
        println!("\n{}\n{}\n", "Assistant:".bold().cyan(), render_markup(markup));
    }

    /// Display conversation history
    pub fn show_history(&self, messages: &[Message]) {
        if messages.is_empty() {
            println!("{}", "No messages yet.".yellow());
            return;
        }

        self.show_section(&format!("Conversation ({} messages)", messages.len()));
        for message in messages {
            let label = match message.role {
                Role::User => "You".green().bold(),
                Role::Assistant => "Assistant".cyan().bold(),
            };
            println!("{}: {}", label, render_markup(&message.content));
        }
        println!();
    }

    /// Display knowledge base documents
    pub fn show_sources(&self, knowledge: &KnowledgeBase) {
        self.show_section(&format!("Knowledge Base ({} documents)", knowledge.len()));
        for (i, doc) in knowledge.documents().iter().enumerate() {
            println!("  {}. {} {}", (i + 1).to_string().cyan(), doc.id.bold(), doc.content.dimmed());
        }
        println!();
    }

    /// Display error message
    pub fn show_error(&self, error: &str) {
        println!("{} {}", "Error:".red().bold(), error.red());
    }

    /// Display info message
    pub fn show_info(&self, info: &str) {
        println!("{} {}", "Info:".cyan(), info);
    }

    /// Clear screen
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(io::stdout(), Clear(ClearType::All), cursor::MoveTo(0, 0))
    }

    /// Show section header
    pub fn show_section(&self, title: &str) {
        println!("\n{}", title.bold().cyan());
        println!("{}", "-".repeat(60).cyan());
    }
}

impl Default for DisplayManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::events::EventBus;
    use crate::rag::events::PlaceholderSink;
    use crate::rag::progress;

    #[test]
    fn test_render_final_response() {
        let markup = progress::format_response("Line one\nLine two", 2);
        let text = render_markup(&markup);
        assert!(text.contains("Line one\nLine two"));
        assert!(text.contains("Context Sources: 2"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_render_list_items() {
        let text = render_markup("<ul><li>Unplug the TV</li><li>Fix the fridge seal</li></ul>");
        assert!(text.contains("• Unplug the TV"));
        assert!(text.contains("• Fix the fridge seal"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_render_bold_keeps_text() {
        let text = render_markup("Save <b>$15/month</b> now");
        assert!(text.contains("$15/month"));
        assert!(!text.contains("<b>"));
    }

    #[test]
    fn test_plain_text_has_no_styling() {
        assert_eq!(plain_text("Save <strong>$15</strong>"), "Save $15");
    }

    #[test]
    fn test_render_decodes_entities() {
        assert_eq!(render_markup("A &amp; B &lt;3"), "A & B <3");
    }

    #[test]
    fn test_summarize_progress_markup() {
        let summary = summarize_markup(&progress::analyzing());
        assert_eq!(summary, "Step 1: Intent Analysis | Analyzing query for keywords...");
    }

    #[test]
    fn test_handle_event_lifecycle() {
        let mut manager = DisplayManager::new();
        let id = CorrelationId::new();

        assert!(!manager.handle_event(&PlaceholderEvent::Created {
            id,
            content: progress::initializing(),
        }));
        assert_eq!(manager.active_placeholders(), 1);

        assert!(!manager.handle_event(&PlaceholderEvent::Updated {
            id,
            content: progress::analyzing(),
        }));

        assert!(manager.handle_event(&PlaceholderEvent::Finalized {
            id,
            content: progress::format_response("done", 1),
        }));
        assert_eq!(manager.active_placeholders(), 0);
    }

    #[tokio::test]
    async fn test_follow_run_stops_at_own_finalization() {
        let (bus, mut receiver) = EventBus::new();
        let mine = CorrelationId::new();
        let other = CorrelationId::new();

        bus.on_placeholder_created(mine, "mine");
        bus.on_placeholder_created(other, "other");
        bus.on_placeholder_finalized(other, "other done");
        bus.on_placeholder_finalized(mine, "mine done");
        bus.on_placeholder_updated(other, "after");

        let mut manager = DisplayManager::new();
        assert!(manager.follow_run(&mut receiver, mine).await);
        assert_eq!(receiver.recv().await.unwrap().content(), "after");
    }

    #[tokio::test]
    async fn test_follow_run_channel_closed() {
        let (bus, mut receiver) = EventBus::new();
        drop(bus);
        let mut manager = DisplayManager::new();
        assert!(!manager.follow_run(&mut receiver, CorrelationId::new()).await);
    }
}
