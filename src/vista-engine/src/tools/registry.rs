//! Tool registry.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::{ExifToolHandler, ToolContext, ToolHandler, ToolResult};
use crate::client::ToolDefinition;
use crate::error::{Result, VistaError};

/// Registry of tool handlers, keyed by lowercased name.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("ToolRegistry").field("tools", &names).finish()
    }
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in metadata tool.
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(ExifToolHandler::new()?));
        Ok(registry)
    }

    /// Register a handler. A handler with the same name is replaced.
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        self.handlers.insert(handler.name().to_lowercase(), handler);
    }

    /// Check if a tool is registered. Case-insensitive.
    pub fn has(&self, name: &str) -> bool {
        self.handlers.contains_key(&name.to_lowercase())
    }

    /// Returns `true` if no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Definitions of all tools, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> =
            self.handlers.values().map(|h| h.definition()).collect();
        definitions.sort_by(|a, b| a.name().cmp(b.name()));
        definitions
    }

    /// Execute a tool by name. Unknown names are an error.
    pub async fn execute(
        &self,
        name: &str,
        arguments: Value,
        context: &ToolContext,
    ) -> Result<ToolResult> {
        let Some(handler) = self.handlers.get(&name.to_lowercase()) else {
            return Err(VistaError::UnknownTool {
                name: name.to_string(),
            });
        };

        tracing::info!(tool = %handler.name(), "Executing tool");
        handler.execute(arguments, context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoUrl;

    #[async_trait]
    impl ToolHandler for EchoUrl {
        fn name(&self) -> &str {
            "EchoUrl"
        }

        fn definition(&self) -> ToolDefinition {
            ToolDefinition::function("EchoUrl", "echo", json!({"type": "object"}))
        }

        async fn execute(&self, arguments: Value, context: &ToolContext) -> Result<ToolResult> {
            Ok(ToolResult::success(format!(
                "{} {}",
                context.image_url,
                arguments["extra"].as_str().unwrap_or("-")
            )))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoUrl));
        registry
    }

    #[tokio::test]
    async fn test_dispatch_is_case_insensitive() {
        let registry = registry();
        let context = ToolContext::new("https://example.com/x.png");

        let result = registry
            .execute("echourl", json!({"extra": "ok"}), &context)
            .await
            .expect("tool runs");
        assert_eq!(result, ToolResult::success("https://example.com/x.png ok"));
        assert!(registry.has("ECHOURL"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error() {
        let registry = registry();
        let context = ToolContext::new("u");
        let err = registry
            .execute("geocode", json!({}), &context)
            .await
            .expect_err("unknown tool");
        assert!(matches!(err, VistaError::UnknownTool { name } if name == "geocode"));
    }

    #[test]
    fn test_defaults_offer_exiftool() {
        let registry = ToolRegistry::with_defaults().expect("registry builds");
        let names: Vec<String> = registry
            .definitions()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["exiftool".to_string()]);
    }
}
