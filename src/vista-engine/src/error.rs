//! Error types for Vista Engine.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Vista operations.
pub type Result<T> = std::result::Result<T, VistaError>;

/// Main error type for Vista Engine.
#[derive(Debug, Error)]
pub enum VistaError {
    // Configuration errors
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration: {field} - {message}")]
    InvalidConfig { field: String, message: String },

    #[error("API key not found, set OPENAI_API_KEY or model.api_key")]
    ApiKeyNotFound,

    // Network errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Connection failed to {endpoint}: {message}")]
    ConnectionFailed { endpoint: String, message: String },

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Request timeout")]
    Timeout,

    // Tool errors
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid arguments for tool {tool}: {message}")]
    InvalidToolArguments { tool: String, message: String },

    #[error("Too many tool rounds in one turn (limit {limit})")]
    ToolRoundLimit { limit: u32 },

    // Turn lifecycle errors
    #[error("A turn is already in progress")]
    TurnInProgress,

    #[error("No conversation started, describe an image first")]
    NoConversation,

    // File system errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VistaError {
    /// Create an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error ends the current turn rather than the whole session.
    pub fn is_turn_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnknownTool { .. }
                | Self::InvalidToolArguments { .. }
                | Self::ToolRoundLimit { .. }
                | Self::Backend { .. }
                | Self::ConnectionFailed { .. }
                | Self::Network(_)
                | Self::Timeout
        )
    }

    /// Check if this error is about credentials.
    pub fn is_auth_error(&self) -> bool {
        match self {
            Self::ApiKeyNotFound => true,
            Self::Backend { message } => {
                let lower = message.to_lowercase();
                lower.contains("401") || lower.contains("unauthorized") || lower.contains("api key")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VistaError::invalid_config("model.name", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: model.name - must not be empty"
        );

        let err = VistaError::UnknownTool {
            name: "geocode".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown tool: geocode");
    }

    #[test]
    fn test_turn_fatal() {
        assert!(
            VistaError::UnknownTool {
                name: "x".to_string()
            }
            .is_turn_fatal()
        );
        assert!(!VistaError::TurnInProgress.is_turn_fatal());
        assert!(!VistaError::invalid_config("x", "y").is_turn_fatal());
        assert!(!VistaError::NoConversation.is_turn_fatal());
    }

    #[test]
    fn test_auth_error() {
        assert!(VistaError::ApiKeyNotFound.is_auth_error());
        assert!(VistaError::backend("HTTP 401 Unauthorized").is_auth_error());
        assert!(!VistaError::Timeout.is_auth_error());
    }
}
