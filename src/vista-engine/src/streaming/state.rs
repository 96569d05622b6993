//! Turn state types.
//!
//! This module defines the [`TurnState`] enum that represents every state a
//! model turn passes through while its answer streams in.

use std::fmt;
use std::time::{Duration, Instant};

/// Why a turn stopped receiving chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettleReason {
    /// The model finished its answer.
    Completed,
    /// The connection dropped or the stream ended without a finish marker.
    Interrupted,
    /// No chunk arrived within the configured inactivity timeout.
    TimedOut,
}

impl fmt::Display for SettleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::TimedOut => "timed out",
        };
        f.write_str(text)
    }
}

/// The current state of a model turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnState {
    /// No turn has been started yet.
    Idle,

    /// Chunks of the answer are arriving.
    Accumulating {
        /// Chunks received in the current segment.
        chunks_received: u32,
        /// When the turn started.
        started_at: Instant,
    },

    /// The model asked for a tool; its result is being computed.
    ExecutingTool {
        /// Name of the tool being executed.
        tool_name: String,
        /// When the turn started.
        started_at: Instant,
    },

    /// The turn is over. The card stays as last committed.
    Settled {
        /// Total chunks received over the whole turn.
        chunks: u32,
        /// Total duration of the turn.
        duration: Duration,
        /// How the stream ended.
        reason: SettleReason,
    },

    /// The turn ended with a fatal error.
    Failed(String),
}

impl TurnState {
    /// Returns `true` while a turn is running.
    ///
    /// A new turn can only be started when this is `false`.
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Accumulating { .. } | Self::ExecutingTool { .. })
    }

    /// Returns `true` if currently receiving chunks.
    #[inline]
    pub fn is_accumulating(&self) -> bool {
        matches!(self, Self::Accumulating { .. })
    }

    /// Returns `true` if the last turn finished (in any way but failure).
    #[inline]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled { .. })
    }

    /// Returns `true` if the last turn failed.
    #[inline]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the tool name while a tool is executing.
    pub fn tool_name(&self) -> Option<&str> {
        match self {
            Self::ExecutingTool { tool_name, .. } => Some(tool_name),
            _ => None,
        }
    }

    /// Returns the settle reason of a finished turn.
    pub fn settle_reason(&self) -> Option<SettleReason> {
        match self {
            Self::Settled { reason, .. } => Some(*reason),
            _ => None,
        }
    }

    /// Returns the error message if the turn failed.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}
