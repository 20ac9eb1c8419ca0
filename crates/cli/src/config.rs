//! Configuration loading from mwb.toml.

use runtime::{DEFAULT_MAX_TURNS, Provider};
use serde::Deserialize;
use std::path::Path;

/// Config file looked up in the working directory when `--config` is absent.
pub const CONFIG_FILE: &str = "mwb.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Model provider configuration.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Tool-calling loop configuration.
    #[serde(default)]
    pub caller: CallerConfig,
}

/// Backend provider configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
    pub provider: Provider,

    /// Model to use. Falls back to the provider's default.
    pub model: Option<String>,

    pub max_tokens: u32,

    /// API key. Falls back to the provider's environment variable.
    pub api_key: Option<String>,

    pub system: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            max_tokens: 1000,
            api_key: None,
            system: None,
        }
    }
}

/// Caller configuration.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CallerConfig {
    pub max_turns: usize,

    /// Tools advertised to the model. Empty means all.
    pub allowed_tools: Vec<String>,

    /// Remote MCP endpoint. Without one a local server is spawned.
    pub mcp_url: Option<String>,
}

impl Default for CallerConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            allowed_tools: Vec::new(),
            mcp_url: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load `path` if given, otherwise `mwb.toml` when it exists, otherwise
    /// defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).exists() => Self::load(CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The configured key, or the one in the provider's environment variable.
    pub fn api_key(&self) -> Option<String> {
        self.backend
            .api_key
            .clone()
            .or_else(|| std::env::var(self.backend.provider.api_key_env()).ok())
            .filter(|key| !key.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.backend.provider, Provider::Anthropic);
        assert_eq!(config.backend.max_tokens, 1000);
        assert_eq!(config.caller.max_turns, DEFAULT_MAX_TURNS);
        assert!(config.caller.allowed_tools.is_empty());
        assert!(config.caller.mcp_url.is_none());
    }

    #[test]
    fn full_file_parses() {
        let config = Config::parse(
            r#"
            [backend]
            provider = "gemini"
            model = "gemini-2.0-flash-001"
            max_tokens = 500
            api_key = "from-file"

            [caller]
            max_turns = 3
            allowed_tools = ["get_study_summary"]
            mcp_url = "http://localhost:8080/mcp"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.provider, Provider::Gemini);
        assert_eq!(config.backend.model.as_deref(), Some("gemini-2.0-flash-001"));
        assert_eq!(config.backend.max_tokens, 500);
        assert_eq!(config.api_key().as_deref(), Some("from-file"));
        assert_eq!(config.caller.max_turns, 3);
        assert_eq!(config.caller.allowed_tools, ["get_study_summary"]);
        assert_eq!(
            config.caller.mcp_url.as_deref(),
            Some("http://localhost:8080/mcp")
        );
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = Config::parse("[backend]\nprovider = \"mistral\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("[caller]\nmax_turn = 3").is_err());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::discover(Some(Path::new("/nonexistent/mwb.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
