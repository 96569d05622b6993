//! Streaming render control.
//!
//! The model's answer arrives as a sequence of text chunks. After every chunk
//! the [`CardStreamController`] re-parses everything received so far and
//! decides whether the card on screen may be replaced. Most intermediate
//! buffers are not valid YAML; those leave the card alone.
//!
//! # Example
//!
//! ```rust,ignore
//! use vista_engine::streaming::{CardStreamController, SettleReason};
//!
//! let mut controller = CardStreamController::new();
//! controller.begin_turn()?;
//!
//! controller.push_chunk("```yaml\n");          // retained, nothing parsed yet
//! controller.push_chunk("title: Cat\n");       // committed
//! controller.push_chunk("descript");           // retained, truncated key
//! controller.push_chunk("ion: A cat.\n");      // committed
//!
//! controller.settle(SettleReason::Completed);
//! assert_eq!(controller.card().title(), Some("Cat"));
//! ```

mod controller;
mod state;
mod tool_calls;


pub use controller::{CardStreamController, ChunkOutcome};
pub use state::{SettleReason, TurnState};
pub use tool_calls::{PendingToolCall, ToolCallAccumulator};
