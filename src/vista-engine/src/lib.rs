//! Vista Engine - conversation and streaming card control.
//!
//! This crate drives a conversation with a multimodal model about an image
//! and keeps a [`vista_card::CardViewModel`] in sync with the partial YAML
//! answer while it streams in.
//!
//! - [`client`]: model client trait and an OpenAI-compatible SSE client
//! - [`streaming`]: the chunk-by-chunk parse and commit controller
//! - [`tools`]: tools the model may call (image metadata)
//! - [`session`]: one conversation, its turns and tool round trips
//! - [`config`]: TOML configuration with environment overrides

pub mod client;
pub mod config;
pub mod conversation;
pub mod error;
pub mod http_client;
pub mod prompt;
pub mod session;
pub mod sink;
pub mod streaming;
pub mod tools;

pub use client::{ModelClient, OpenAiClient};
pub use config::VistaConfig;
pub use conversation::Conversation;
pub use error::{Result, VistaError};
pub use prompt::DescribeRequest;
pub use session::{DescribeSession, SessionOptions, TurnSummary};
pub use sink::{RecordingSink, UiSink};
pub use streaming::{CardStreamController, ChunkOutcome, SettleReason, TurnState};
pub use tools::{ExifToolHandler, ToolRegistry};
