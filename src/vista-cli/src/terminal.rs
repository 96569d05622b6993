//! Terminal output.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use vista_card::CardViewModel;
use vista_engine::UiSink;
use vista_engine::tools::ToolResult;

/// Width the card is wrapped to.
pub const CARD_WIDTH: usize = 80;

/// Streams the transcript to stdout and remembers the latest card.
#[derive(Debug, Default)]
pub struct TerminalSink {
    card: CardViewModel,
    updates: u32,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Card replacements seen so far.
    pub fn updates(&self) -> u32 {
        self.updates
    }

    /// The latest card.
    pub fn card(&self) -> &CardViewModel {
        &self.card
    }
}

impl UiSink for TerminalSink {
    fn append_transcript(&mut self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    fn replace_card(&mut self, card: &CardViewModel) {
        self.card = card.clone();
        self.updates += 1;
    }

    fn tool_finished(&mut self, tool: &str, result: &ToolResult) {
        let status = if result.success { "ok" } else { "failed" };
        eprintln!("[{tool}: {status}]");
    }
}

/// Prints a card framed by rules, or a note when it is empty.
pub fn print_card(card: &CardViewModel) {
    let rule = "-".repeat(CARD_WIDTH);
    println!("\n{rule}");
    if card.is_empty() {
        println!("(no card)");
    } else {
        println!("{}", card.to_plain_text(CARD_WIDTH));
    }
    println!("{rule}");
}

/// Writes the card as an HTML fragment.
pub fn write_html(card: &CardViewModel, path: &Path) -> Result<()> {
    std::fs::write(path, card.to_html())
        .with_context(|| format!("Failed to write {}", path.display()))
}
