//! Tools the model may call while describing an image.

mod exif;
mod registry;

pub use exif::{EXIF_TOOL_NAME, ExifToolHandler, describe_image_bytes};
pub use registry::ToolRegistry;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::ToolDefinition;
use crate::error::Result;

/// Context injected by the session into every tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolContext {
    /// URL of the image the conversation is about.
    pub image_url: String,
}

impl ToolContext {
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
        }
    }
}

/// Result of a tool execution.
///
/// An unsuccessful result is still reported back to the model; only an
/// `Err` from [`ToolHandler::execute`] ends the turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    /// Text handed back to the model.
    pub output: String,
    /// Whether execution was successful.
    pub success: bool,
}

impl ToolResult {
    /// Create a successful result.
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            success: true,
        }
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            output: message.into(),
            success: false,
        }
    }
}

/// Trait for tool handlers.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Name the model calls the tool by.
    fn name(&self) -> &str;

    /// Definition offered to the model.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with the model's arguments.
    async fn execute(&self, arguments: Value, context: &ToolContext) -> Result<ToolResult>;
}
