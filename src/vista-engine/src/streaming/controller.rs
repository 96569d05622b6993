//! Card stream controller.
//!
//! This module provides the [`CardStreamController`] that owns the text
//! buffer of the current turn and the card currently on screen.

use std::time::Instant;

use vista_card::{CardViewModel, ParseFailure, parse, project};

use super::state::{SettleReason, TurnState};
use crate::error::{Result, VistaError};

/// What a chunk did to the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The buffer parsed into a record and the card was replaced.
    Committed,
    /// The buffer did not yield a usable record; the card is unchanged.
    Retained(ParseFailure),
    /// The buffer parsed into the card already shown.
    Unchanged,
    /// No turn is accumulating, so the chunk was dropped.
    Ignored,
}

impl ChunkOutcome {
    /// Returns `true` if the card was replaced.
    #[inline]
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Controller for the incremental parse-and-render loop.
///
/// Every chunk is appended to the buffer and the whole buffer is parsed
/// again. A parse whose projection is a non-empty card different from the
/// current one replaces the card; anything else leaves the previous card in
/// place, so the card only ever shows the projection of some prefix of the
/// answer. A mapping holding only unrecognized keys (`Here is the card:`)
/// projects to nothing and never blanks the card.
///
/// The buffer belongs to one response segment: it is cleared when a turn
/// begins and when the model resumes after a tool call. The card is never
/// cleared by a new turn, only replaced by the next successful parse.
#[derive(Debug)]
pub struct CardStreamController {
    /// Current state of the turn.
    state: TurnState,

    /// Text of the current response segment.
    buffer: String,

    /// Card currently displayed.
    card: CardViewModel,

    /// Chunks received in the current turn.
    turn_chunks: u32,

    /// Card replacements in the current turn.
    commits: u32,

    /// Start time of the current turn.
    started_at: Option<Instant>,
}

impl Default for CardStreamController {
    fn default() -> Self {
        Self::new()
    }
}

impl CardStreamController {
    /// Creates an idle controller showing the empty card.
    pub fn new() -> Self {
        Self {
            state: TurnState::Idle,
            buffer: String::new(),
            card: CardViewModel::empty(),
            turn_chunks: 0,
            commits: 0,
            started_at: None,
        }
    }

    // --------------------------------------------------------
    // Accessors
    // --------------------------------------------------------

    /// Current turn state.
    pub fn state(&self) -> &TurnState {
        &self.state
    }

    /// The card currently displayed.
    pub fn card(&self) -> &CardViewModel {
        &self.card
    }

    /// Text of the current response segment.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Chunks received in the current turn, across all segments.
    pub fn chunks_received(&self) -> u32 {
        self.turn_chunks
    }

    /// Card replacements in the current turn.
    pub fn commits(&self) -> u32 {
        self.commits
    }

    // --------------------------------------------------------
    // Turn lifecycle
    // --------------------------------------------------------

    /// Starts a new turn. The card is kept.
    ///
    /// Fails with [`VistaError::TurnInProgress`] while another turn is active.
    pub fn begin_turn(&mut self) -> Result<()> {
        if self.state.is_active() {
            tracing::warn!(state = ?self.state, "Rejected turn while another is active");
            return Err(VistaError::TurnInProgress);
        }

        let now = Instant::now();
        self.buffer.clear();
        self.turn_chunks = 0;
        self.commits = 0;
        self.started_at = Some(now);
        self.state = TurnState::Accumulating {
            chunks_received: 0,
            started_at: now,
        };
        tracing::debug!("Turn started");
        Ok(())
    }

    /// Feeds one chunk of model text through parse and projection.
    pub fn push_chunk(&mut self, chunk: &str) -> ChunkOutcome {
        let TurnState::Accumulating {
            chunks_received, ..
        } = &mut self.state
        else {
            tracing::trace!(state = ?self.state, "Chunk outside of an accumulating turn");
            return ChunkOutcome::Ignored;
        };

        *chunks_received += 1;
        self.turn_chunks += 1;
        self.buffer.push_str(chunk);

        let details = match parse(&self.buffer) {
            Ok(details) => details,
            Err(failure) => {
                tracing::trace!(
                    buffer_len = self.buffer.len(),
                    reason = %failure,
                    "Previous card retained"
                );
                return ChunkOutcome::Retained(failure);
            }
        };

        let card = project(&details);
        if card.is_empty() {
            tracing::trace!(
                buffer_len = self.buffer.len(),
                extra_keys = details.extra.len(),
                "Record without card fields retained"
            );
            return ChunkOutcome::Retained(ParseFailure::NotARecord);
        }
        if card == self.card {
            return ChunkOutcome::Unchanged;
        }

        self.card = card;
        self.commits += 1;
        tracing::debug!(
            chunk_len = chunk.len(),
            buffer_len = self.buffer.len(),
            commits = self.commits,
            "Card committed"
        );
        ChunkOutcome::Committed
    }

    /// The model asked for a tool; no chunks are accepted until [`resume_segment`].
    ///
    /// [`resume_segment`]: Self::resume_segment
    pub fn start_tool(&mut self, tool_name: &str) {
        let Some(started_at) = self.started_at.filter(|_| self.state.is_active()) else {
            tracing::warn!(state = ?self.state, tool = %tool_name, "Tool started outside of a turn");
            return;
        };
        tracing::debug!(tool = %tool_name, "Executing tool");
        self.state = TurnState::ExecutingTool {
            tool_name: tool_name.to_string(),
            started_at,
        };
    }

    /// Tool results are in; the model's continuation starts a fresh segment.
    pub fn resume_segment(&mut self) {
        let Some(started_at) = self.started_at.filter(|_| self.state.is_active()) else {
            tracing::warn!(state = ?self.state, "Resume outside of a turn");
            return;
        };
        self.buffer.clear();
        self.state = TurnState::Accumulating {
            chunks_received: 0,
            started_at,
        };
        tracing::debug!("Response segment resumed");
    }

    /// Ends the turn. The last committed card stays.
    pub fn settle(&mut self, reason: SettleReason) {
        if !self.state.is_active() {
            return;
        }
        let duration = self
            .started_at
            .map(|start| start.elapsed())
            .unwrap_or_default();
        self.state = TurnState::Settled {
            chunks: self.turn_chunks,
            duration,
            reason,
        };
        tracing::debug!(
            chunks = self.turn_chunks,
            commits = self.commits,
            reason = %reason,
            "Turn settled"
        );
    }

    /// Ends the turn with a fatal error. The last committed card stays.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(error = %message, "Turn failed");
        self.state = TurnState::Failed(message);
    }

    /// Forgets the card and returns to idle, for a new image.
    ///
    /// Fails with [`VistaError::TurnInProgress`] while a turn is active.
    pub fn reset(&mut self) -> Result<()> {
        if self.state.is_active() {
            return Err(VistaError::TurnInProgress);
        }
        *self = Self::new();
        Ok(())
    }
}
