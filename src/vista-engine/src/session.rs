//! Describe session.
//!
//! A [`DescribeSession`] holds one conversation about one image. Each turn
//! (the initial describe request or a follow-up question) runs a single
//! sequential loop:
//!
//! 1. stream the model's response, feeding every text chunk to the
//!    transcript and to the [`CardStreamController`];
//! 2. if the response ended by requesting tools, run them, append their
//!    output to the conversation, and stream the continuation;
//! 3. settle when the model finishes, the stream drops, or no chunk arrives
//!    within the chunk timeout.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;
use tokio::time::timeout;
use vista_card::CardViewModel;

use crate::client::{CompletionRequest, FinishReason, ModelClient, ResponseEvent};
use crate::config::VistaConfig;
use crate::conversation::Conversation;
use crate::error::{Result, VistaError};
use crate::prompt::DescribeRequest;
use crate::sink::UiSink;
use crate::streaming::{
    CardStreamController, ChunkOutcome, PendingToolCall, SettleReason, ToolCallAccumulator,
    TurnState,
};
use crate::tools::{ToolContext, ToolRegistry, ToolResult};

/// Per-session behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Longest wait for the next chunk before the stream is considered over.
    pub chunk_timeout: Duration,
    /// Tool round trips allowed inside one turn.
    pub max_tool_rounds: u32,
    /// Whether tools are offered to the model.
    pub tools_enabled: bool,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&VistaConfig::default())
    }
}

impl SessionOptions {
    pub fn from_config(config: &VistaConfig) -> Self {
        Self {
            chunk_timeout: config.stream.chunk_timeout(),
            max_tool_rounds: config.stream.max_tool_rounds,
            tools_enabled: config.describe.tools_enabled,
            temperature: config.model.temperature,
        }
    }
}

/// How a turn went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnSummary {
    /// How the stream ended.
    pub reason: SettleReason,
    /// Text chunks received over the turn.
    pub chunks: u32,
    /// Card replacements during the turn.
    pub commits: u32,
    /// Tools executed during the turn.
    pub tool_calls: u32,
    /// Model text of the final response segment.
    pub text: String,
}

/// A conversation about one image, with its streaming card.
pub struct DescribeSession {
    client: Arc<dyn ModelClient>,
    tools: ToolRegistry,
    options: SessionOptions,
    controller: CardStreamController,
    conversation: Option<Conversation>,
    request: Option<DescribeRequest>,
}

impl std::fmt::Debug for DescribeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescribeSession")
            .field("model", &self.client.model())
            .field("tools", &self.tools)
            .field("options", &self.options)
            .field("state", self.controller.state())
            .field("request", &self.request)
            .finish()
    }
}

impl DescribeSession {
    /// Create a session. Nothing is sent until [`start`](Self::start).
    pub fn new(client: Arc<dyn ModelClient>, tools: ToolRegistry, options: SessionOptions) -> Self {
        Self {
            client,
            tools,
            options,
            controller: CardStreamController::new(),
            conversation: None,
            request: None,
        }
    }

    /// The card currently displayed.
    pub fn card(&self) -> &CardViewModel {
        self.controller.card()
    }

    /// State of the current or last turn.
    pub fn state(&self) -> &TurnState {
        self.controller.state()
    }

    /// The conversation so far, once started.
    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    /// The request the conversation was started with.
    pub fn request(&self) -> Option<&DescribeRequest> {
        self.request.as_ref()
    }

    /// Describe a new image. Replaces any previous conversation and card.
    pub async fn start(
        &mut self,
        request: DescribeRequest,
        sink: &mut dyn UiSink,
    ) -> Result<TurnSummary> {
        let had_card = !self.controller.card().is_empty();
        self.controller.reset()?;
        if had_card {
            sink.replace_card(self.controller.card());
        }

        let mut conversation = Conversation::new(request.system_prompt());
        conversation.push(request.user_message());
        self.conversation = Some(conversation);

        tracing::info!(
            url = %request.image_url,
            words = request.word_count,
            styled = !request.style.trim().is_empty(),
            "Describing image"
        );
        self.request = Some(request);
        self.run_turn(sink).await
    }

    /// Ask a follow-up question about the current image.
    pub async fn follow_up(&mut self, text: &str, sink: &mut dyn UiSink) -> Result<TurnSummary> {
        if self.controller.state().is_active() {
            return Err(VistaError::TurnInProgress);
        }
        let conversation = self
            .conversation
            .as_mut()
            .ok_or(VistaError::NoConversation)?;
        conversation.push_user(text);

        tracing::info!(text_len = text.len(), "Follow-up question");
        self.run_turn(sink).await
    }

    /// Abandon a turn whose future was dropped part way.
    pub fn cancel(&mut self) {
        if self.controller.state().is_active() {
            tracing::warn!("Turn cancelled");
            self.controller.settle(SettleReason::Interrupted);
        }
    }

    async fn run_turn(&mut self, sink: &mut dyn UiSink) -> Result<TurnSummary> {
        self.controller.begin_turn()?;
        match self.drive_turn(sink).await {
            Ok(summary) => {
                tracing::info!(
                    reason = %summary.reason,
                    chunks = summary.chunks,
                    commits = summary.commits,
                    tool_calls = summary.tool_calls,
                    "Turn finished"
                );
                Ok(summary)
            }
            Err(e) => {
                self.controller.fail(e.to_string());
                Err(e)
            }
        }
    }

    async fn drive_turn(&mut self, sink: &mut dyn UiSink) -> Result<TurnSummary> {
        let definitions = if self.options.tools_enabled {
            self.tools.definitions()
        } else {
            vec![]
        };
        let mut rounds = 0u32;
        let mut tool_calls = 0u32;

        loop {
            let messages = self
                .conversation
                .as_ref()
                .ok_or(VistaError::NoConversation)?
                .messages()
                .to_vec();
            let request = CompletionRequest::new(self.client.model(), messages)
                .with_temperature(self.options.temperature)
                .with_tools(definitions.clone());

            let mut stream = self.client.complete(request).await?;

            let mut text = String::new();
            let mut accumulator = ToolCallAccumulator::new();
            let mut finish: Option<FinishReason> = None;
            let mut cut_short: Option<SettleReason> = None;

            loop {
                let event = match timeout(self.options.chunk_timeout, stream.next()).await {
                    Ok(Some(event)) => event,
                    Ok(None) => break,
                    Err(_) => {
                        tracing::warn!(
                            timeout_ms = self.options.chunk_timeout.as_millis() as u64,
                            "No chunk within timeout, keeping last card"
                        );
                        cut_short = Some(SettleReason::TimedOut);
                        break;
                    }
                };

                match event {
                    Ok(ResponseEvent::Delta(chunk)) => {
                        sink.append_transcript(&chunk);
                        text.push_str(&chunk);
                        if let ChunkOutcome::Committed = self.controller.push_chunk(&chunk) {
                            sink.replace_card(self.controller.card());
                        }
                    }
                    Ok(ResponseEvent::ToolCallDelta(delta)) => accumulator.push(delta),
                    Ok(ResponseEvent::Done { finish_reason }) => finish = Some(finish_reason),
                    Err(VistaError::Timeout) => {
                        tracing::warn!("Stream timed out, keeping last card");
                        cut_short = Some(SettleReason::TimedOut);
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Stream interrupted, keeping last card");
                        cut_short = Some(SettleReason::Interrupted);
                        break;
                    }
                }
            }

            if cut_short.is_none() && finish == Some(FinishReason::ToolCalls) && !accumulator.is_empty()
            {
                rounds += 1;
                if rounds > self.options.max_tool_rounds {
                    return Err(VistaError::ToolRoundLimit {
                        limit: self.options.max_tool_rounds,
                    });
                }

                let calls = accumulator.finish();
                self.conversation
                    .as_mut()
                    .ok_or(VistaError::NoConversation)?
                    .push_tool_calls(
                        text,
                        calls.iter().map(PendingToolCall::to_tool_call).collect(),
                    );

                for call in calls {
                    self.controller.start_tool(&call.name);
                    let result = self.dispatch(&call).await?;
                    if !result.success {
                        tracing::warn!(tool = %call.name, call_id = %call.id, output = %result.output, "Tool reported failure");
                    }
                    sink.tool_finished(&call.name, &result);
                    self.conversation
                        .as_mut()
                        .ok_or(VistaError::NoConversation)?
                        .push_tool_result(call.id, result.output);
                    tool_calls += 1;
                }

                self.controller.resume_segment();
                continue;
            }

            let reason = match (cut_short, &finish) {
                (Some(reason), _) => reason,
                (None, Some(_)) => SettleReason::Completed,
                (None, None) => {
                    tracing::warn!("Stream ended without a finish marker, keeping last card");
                    SettleReason::Interrupted
                }
            };

            if !text.is_empty() {
                if let Some(conversation) = self.conversation.as_mut() {
                    conversation.push_assistant(text.clone());
                }
            }
            self.controller.settle(reason);

            return Ok(TurnSummary {
                reason,
                chunks: self.controller.chunks_received(),
                commits: self.controller.commits(),
                tool_calls,
                text,
            });
        }
    }

    async fn dispatch(&self, call: &PendingToolCall) -> Result<ToolResult> {
        if !self.options.tools_enabled {
            return Err(VistaError::UnknownTool {
                name: call.name.clone(),
            });
        }

        let image_url = self
            .request
            .as_ref()
            .map(|r| r.image_url.clone())
            .unwrap_or_default();

        let mut arguments = call.parsed_arguments()?;
        arguments.insert("url".to_string(), Value::String(image_url.clone()));

        tracing::info!(tool = %call.name, call_id = %call.id, "Dispatching tool call");
        self.tools
            .execute(
                &call.name,
                Value::Object(arguments),
                &ToolContext::new(image_url),
            )
            .await
    }
}
