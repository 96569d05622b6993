//! The boundary between a describe session and whatever displays it.

use vista_card::CardViewModel;

use crate::tools::ToolResult;

/// Receives display updates from a [`DescribeSession`](crate::DescribeSession).
///
/// Every chunk of model text goes to [`append_transcript`], whether or not
/// it changed the card. [`replace_card`] is called once per card commit.
///
/// [`append_transcript`]: UiSink::append_transcript
/// [`replace_card`]: UiSink::replace_card
pub trait UiSink: Send {
    /// Append model text to the transcript.
    fn append_transcript(&mut self, text: &str);

    /// Show a new card.
    fn replace_card(&mut self, card: &CardViewModel);

    /// A tool finished; its output goes back to the model.
    fn tool_finished(&mut self, _tool: &str, _result: &ToolResult) {}
}

/// Sink that records everything it is given.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    /// Transcript chunks, in order.
    pub transcript: Vec<String>,
    /// Cards, in commit order.
    pub cards: Vec<CardViewModel>,
    /// Names of finished tools, in order.
    pub tools: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transcript joined into one string.
    pub fn transcript_text(&self) -> String {
        self.transcript.concat()
    }

    /// The last card shown, if any.
    pub fn last_card(&self) -> Option<&CardViewModel> {
        self.cards.last()
    }
}

impl UiSink for RecordingSink {
    fn append_transcript(&mut self, text: &str) {
        self.transcript.push(text.to_string());
    }

    fn replace_card(&mut self, card: &CardViewModel) {
        self.cards.push(card.clone());
    }

    fn tool_finished(&mut self, tool: &str, _result: &ToolResult) {
        self.tools.push(tool.to_string());
    }
}
