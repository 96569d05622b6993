//! OpenAI-compatible chat completions client.
//!
//! Streams `POST {base_url}/chat/completions` as server-sent events. Each
//! `data:` payload is a chunk object whose first choice carries a delta
//! (text and/or tool call fragments) and, on the last chunk, a
//! `finish_reason`.

use std::time::Duration;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_stream::wrappers::ReceiverStream;
use url::Url;

use super::{
    CompletionRequest, FinishReason, ModelClient, ResponseEvent, ResponseStream, ToolCallDelta,
};
use crate::config::VistaConfig;
use crate::error::{Result, VistaError};
use crate::http_client::{USER_AGENT, create_streaming_client};

const OPENAI_HOST: &str = "api.openai.com";

/// Client for OpenAI-compatible endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    model: String,
    base_url: String,
    api_key: Option<String>,
    chunk_timeout: Duration,
}

impl OpenAiClient {
    /// Create a client for `base_url` (without `/chat/completions`).
    pub fn new(
        model: impl Into<String>,
        base_url: impl Into<String>,
        api_key: Option<String>,
        chunk_timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into();
        Url::parse(&base_url)
            .map_err(|e| VistaError::invalid_config("model.base_url", e.to_string()))?;

        Ok(Self {
            client: create_streaming_client()?,
            model: model.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            chunk_timeout,
        })
    }

    /// Create a client from configuration.
    ///
    /// The hosted OpenAI API requires a key; local compatible servers may not.
    pub fn from_config(config: &VistaConfig) -> Result<Self> {
        let api_key = config
            .model
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty());

        let hosted = Url::parse(&config.model.base_url)
            .ok()
            .and_then(|url| url.host_str().map(|host| host == OPENAI_HOST))
            .unwrap_or(false);
        if hosted && api_key.is_none() {
            return Err(VistaError::ApiKeyNotFound);
        }

        Self::new(
            config.model.name.clone(),
            config.model.base_url.clone(),
            api_key,
            config.stream.chunk_timeout(),
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<ResponseStream> {
        let url = self.endpoint();

        let mut req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "text/event-stream")
            .header(reqwest::header::USER_AGENT, USER_AGENT);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        tracing::debug!(
            url = %url,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending completion request"
        );

        let resp = req.json(&request).send().await.map_err(|e| {
            tracing::error!(error = %e, url = %url, "Failed to send request");
            if e.is_connect() || e.is_timeout() {
                VistaError::ConnectionFailed {
                    endpoint: url.clone(),
                    message: e.to_string(),
                }
            } else {
                VistaError::Network(e)
            }
        })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error")?.get("message")?.as_str().map(String::from))
                .unwrap_or_else(|| {
                    let preview: String = body.chars().take(200).collect();
                    format!("HTTP {status} from {}: {preview}", self.base_url)
                });

            tracing::error!(status = %status, url = %url, "API request failed");
            return Err(VistaError::Backend {
                message: format!("{status}: {message}"),
            });
        }

        let (tx, rx) = mpsc::channel::<Result<ResponseEvent>>(100);

        let stream = resp.bytes_stream().eventsource();
        let chunk_timeout = self.chunk_timeout;
        tokio::spawn(async move {
            let mut stream = std::pin::pin!(stream);

            loop {
                let event = match timeout(chunk_timeout, stream.next()).await {
                    Ok(Some(Ok(event))) => event,
                    Ok(Some(Err(e))) => {
                        let _ = tx
                            .send(Err(VistaError::backend(format!("Stream error: {e}"))))
                            .await;
                        break;
                    }
                    Ok(None) => break,
                    Err(_) => {
                        tracing::warn!(
                            timeout_secs = chunk_timeout.as_secs(),
                            "No SSE data received within chunk timeout"
                        );
                        let _ = tx.send(Err(VistaError::Timeout)).await;
                        break;
                    }
                };

                if event.data.is_empty() || event.data == "[DONE]" {
                    continue;
                }

                let chunk = match serde_json::from_str::<ChatChunk>(&event.data) {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        tracing::debug!(error = %e, data = %event.data, "Skipping unparseable chunk");
                        continue;
                    }
                };

                for response_event in chunk.into_events() {
                    if tx.send(Ok(response_event)).await.is_err() {
                        return;
                    }
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ChunkToolCall>,
}

#[derive(Debug, Deserialize)]
struct ChunkToolCall {
    #[serde(default)]
    index: u32,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<ChunkFunction>,
}

#[derive(Debug, Deserialize)]
struct ChunkFunction {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

impl ChatChunk {
    fn into_events(self) -> Vec<ResponseEvent> {
        let Some(choice) = self.choices.into_iter().next() else {
            return vec![];
        };

        let mut events = Vec::new();
        if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
            events.push(ResponseEvent::Delta(content));
        }
        for call in choice.delta.tool_calls {
            let (name, arguments) = match call.function {
                Some(function) => (function.name, function.arguments.unwrap_or_default()),
                None => (None, String::new()),
            };
            events.push(ResponseEvent::ToolCallDelta(ToolCallDelta {
                index: call.index,
                id: call.id,
                name,
                arguments,
            }));
        }
        if let Some(reason) = choice.finish_reason {
            events.push(ResponseEvent::Done {
                finish_reason: FinishReason::from_wire(&reason),
            });
        }
        events
    }
}
