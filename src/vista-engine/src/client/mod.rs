//! Model client.
//!
//! A [`ModelClient`] turns a [`CompletionRequest`] into a stream of
//! [`ResponseEvent`]s. [`OpenAiClient`] talks to any OpenAI-compatible
//! `/chat/completions` endpoint; tests substitute scripted clients.

mod openai;
pub mod types;

pub use openai::OpenAiClient;
pub use types::*;

use std::pin::Pin;

use async_trait::async_trait;
use tokio_stream::Stream;

use crate::error::Result;

/// Stream type for response events.
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<ResponseEvent>> + Send>>;

/// Trait for model clients.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Get the model name.
    fn model(&self) -> &str;

    /// Send a completion request and get a stream of responses.
    ///
    /// An `Err` here means the request never started streaming. Errors
    /// inside the stream mean it was cut off part way.
    async fn complete(&self, request: CompletionRequest) -> Result<ResponseStream>;
}
