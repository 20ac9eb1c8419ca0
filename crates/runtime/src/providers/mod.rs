//! LLM provider adapters.
//!
//! Each provider implements [`Backend`] for its specific API.

mod anthropic;
mod gemini;
mod openai;

pub use anthropic::{AnthropicBackend, AnthropicBackendBuilder};
pub use gemini::{GeminiBackend, GeminiBackendBuilder};
pub use openai::{OpenAiBackend, OpenAiBackendBuilder};

use crate::model::{Backend, ModelError, ModelRequest, ModelResponse};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Anthropic,
    OpenAi,
    Gemini,
}

impl Provider {
    /// Model used when none is configured.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => "claude-3-haiku-20240307",
            Self::OpenAi => "gpt-5-nano",
            Self::Gemini => "gemini-2.0-flash-001",
        }
    }

    /// Environment variable holding the API key.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anthropic => write!(f, "anthropic"),
            Self::OpenAi => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" | "chatgpt" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(format!(
                "unknown provider '{other}': expected anthropic, openai or gemini"
            )),
        }
    }
}

/// Settings shared by every provider backend.
#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub provider: Provider,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub system: Option<String>,
}

/// A backend chosen at runtime.
pub enum ProviderBackend {
    Anthropic(AnthropicBackend),
    OpenAi(OpenAiBackend),
    Gemini(GeminiBackend),
}

impl ProviderBackend {
    /// Build the backend for the configured provider.
    pub fn new(settings: BackendSettings) -> Self {
        let BackendSettings {
            provider,
            api_key,
            model,
            max_tokens,
            system,
        } = settings;

        match provider {
            Provider::Anthropic => {
                let mut builder = AnthropicBackend::builder(api_key, model).max_tokens(max_tokens);
                if let Some(system) = system {
                    builder = builder.system(system);
                }
                Self::Anthropic(builder.build())
            }
            Provider::OpenAi => {
                let mut builder = OpenAiBackend::builder(api_key, model).max_tokens(max_tokens);
                if let Some(system) = system {
                    builder = builder.system(system);
                }
                Self::OpenAi(builder.build())
            }
            Provider::Gemini => {
                let mut builder = GeminiBackend::builder(api_key, model).max_tokens(max_tokens);
                if let Some(system) = system {
                    builder = builder.system(system);
                }
                Self::Gemini(builder.build())
            }
        }
    }
}

impl std::fmt::Display for ProviderBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anthropic(b) => std::fmt::Display::fmt(b, f),
            Self::OpenAi(b) => std::fmt::Display::fmt(b, f),
            Self::Gemini(b) => std::fmt::Display::fmt(b, f),
        }
    }
}

impl Backend for ProviderBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        match self {
            Self::Anthropic(b) => b.call(request).await,
            Self::OpenAi(b) => b.call(request).await,
            Self::Gemini(b) => b.call(request).await,
        }
    }
}
