//! Configuration.
//!
//! Loaded from TOML (`--config <path>` or `~/.vista/config.toml`), then
//! overridden from the environment. Every section has defaults, so an empty
//! file is a valid configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VistaError};

const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VistaConfig {
    /// Model endpoint.
    #[serde(default)]
    pub model: ModelConfig,

    /// Streaming behaviour.
    #[serde(default)]
    pub stream: StreamConfig,

    /// Describe request defaults.
    #[serde(default)]
    pub describe: DescribeConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Model endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name sent with each request.
    #[serde(default = "default_model")]
    pub name: String,

    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key. Usually taken from `OPENAI_API_KEY` instead.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Sampling temperature.
    #[serde(default)]
    pub temperature: Option<f32>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            base_url: default_base_url(),
            api_key: None,
            temperature: None,
        }
    }
}

/// Streaming configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Seconds without a chunk before the stream is treated as ended.
    #[serde(default = "default_chunk_timeout")]
    pub chunk_timeout_secs: u64,

    /// Tool round trips allowed inside one turn.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,
}

fn default_chunk_timeout() -> u64 {
    60
}

fn default_max_tool_rounds() -> u32 {
    4
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_timeout_secs: default_chunk_timeout(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

impl StreamConfig {
    /// Chunk inactivity timeout as a Duration.
    pub fn chunk_timeout(&self) -> Duration {
        Duration::from_secs(self.chunk_timeout_secs)
    }
}

/// Defaults for a describe request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescribeConfig {
    /// Target description length in words.
    #[serde(default = "default_word_count")]
    pub word_count: u32,

    /// Stylistic directive ("in the style of ..."), empty for none.
    #[serde(default)]
    pub style: String,

    /// Whether the model may call the metadata tool.
    #[serde(default = "default_true")]
    pub tools_enabled: bool,
}

fn default_word_count() -> u32 {
    250
}

fn default_true() -> bool {
    true
}

impl Default for DescribeConfig {
    fn default() -> Self {
        Self {
            word_count: default_word_count(),
            style: String::new(),
            tools_enabled: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl VistaConfig {
    /// Default config file location: `~/.vista/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".vista").join("config.toml"))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VistaError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path must exist; the default path is used only when present.
    /// Environment overrides are applied last, then the result is validated.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load(path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup("VISTA_MODEL") {
            self.model.name = model;
        }
        if let Some(url) = lookup("VISTA_API_URL") {
            self.model.base_url = url;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.model.api_key = Some(key);
        }
        if let Some(secs) = lookup("VISTA_CHUNK_TIMEOUT_SECS") {
            match secs.parse() {
                Ok(secs) => self.stream.chunk_timeout_secs = secs,
                Err(_) => {
                    tracing::warn!(value = %secs, "Ignoring invalid VISTA_CHUNK_TIMEOUT_SECS");
                }
            }
        }
    }

    /// Check values that would make a session unusable.
    pub fn validate(&self) -> Result<()> {
        if self.model.name.trim().is_empty() {
            return Err(VistaError::invalid_config("model.name", "must not be empty"));
        }
        if self.model.base_url.trim().is_empty() {
            return Err(VistaError::invalid_config(
                "model.base_url",
                "must not be empty",
            ));
        }
        if self.stream.chunk_timeout_secs == 0 {
            return Err(VistaError::invalid_config(
                "stream.chunk_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.describe.word_count == 0 {
            return Err(VistaError::invalid_config(
                "describe.word_count",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = VistaConfig::from_toml("").expect("empty config parses");
        assert_eq!(config, VistaConfig::default());
        assert_eq!(config.model.name, "gpt-4o");
        assert_eq!(config.stream.chunk_timeout(), Duration::from_secs(60));
        assert_eq!(config.describe.word_count, 250);
        assert!(config.describe.tools_enabled);
    }

    #[test]
    fn test_partial_toml() {
        let config = VistaConfig::from_toml(
            r#"
[model]
name = "gpt-4o-mini"

[describe]
style = "Ernest Hemingway"
tools_enabled = false
"#,
        )
        .expect("config parses");

        assert_eq!(config.model.name, "gpt-4o-mini");
        assert_eq!(config.model.base_url, "https://api.openai.com/v1");
        assert_eq!(config.describe.style, "Ernest Hemingway");
        assert!(!config.describe.tools_enabled);
        assert_eq!(config.describe.word_count, 250);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("VISTA_MODEL", "llava"),
            ("VISTA_API_URL", "http://localhost:1234/v1"),
            ("OPENAI_API_KEY", "sk-test"),
            ("VISTA_CHUNK_TIMEOUT_SECS", "5"),
        ]);
        let mut config = VistaConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.model.name, "llava");
        assert_eq!(config.model.base_url, "http://localhost:1234/v1");
        assert_eq!(config.model.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.stream.chunk_timeout_secs, 5);
    }

    #[test]
    fn test_invalid_timeout_env_ignored() {
        let mut config = VistaConfig::default();
        config.apply_env(|key| (key == "VISTA_CHUNK_TIMEOUT_SECS").then(|| "soon".to_string()));
        assert_eq!(config.stream.chunk_timeout_secs, 60);
    }

    #[test]
    fn test_validate() {
        assert!(VistaConfig::default().validate().is_ok());

        let mut config = VistaConfig::default();
        config.stream.chunk_timeout_secs = 0;
        assert!(matches!(
            config.validate(),
            Err(VistaError::InvalidConfig { field, .. }) if field == "stream.chunk_timeout_secs"
        ));

        let mut config = VistaConfig::default();
        config.describe.word_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = VistaConfig::load(dir.path().join("nope.toml"));
        assert!(matches!(result, Err(VistaError::ConfigNotFound { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[stream]\nchunk_timeout_secs = 10\n").expect("write config");

        let config = VistaConfig::load(&path).expect("config loads");
        assert_eq!(config.stream.chunk_timeout_secs, 10);
    }
}
