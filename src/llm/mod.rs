//! Language-model backends.
//!
//! Supports:
//! - **Ollama**: local inference via ollama-rs, with native streaming
//! - **Anthropic** / **OpenAI**: hosted models via rig-core
//!
//! Every backend implements `LlmProvider`; the dialogue controller never
//! sees which one it is talking to.

pub mod ollama;
pub mod provider;
mod rig_adapter;

pub use ollama::OllamaProvider;
pub use provider::*;
pub use rig_adapter::RigAdapter;

use std::sync::Arc;

use rig::client::CompletionClient;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{ConfigError, LlmError};

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Ollama,
    Anthropic,
    OpenAi,
}

impl std::str::FromStr for LlmBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            other => Err(ConfigError::InvalidValue {
                key: "GRIEVANCE_BACKEND".to_string(),
                message: format!("unknown backend '{other}' (expected ollama, anthropic, openai)"),
            }),
        }
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    /// Only hosted backends need a key.
    pub api_key: Option<SecretString>,
    pub model: String,
    /// Ollama base URL.
    pub base_url: String,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match config.backend {
        LlmBackend::Ollama => {
            tracing::info!("Using Ollama at {} (model: {})", config.base_url, config.model);
            Ok(Arc::new(OllamaProvider::new(&config.base_url, &config.model)))
        }
        LlmBackend::Anthropic => create_anthropic_provider(config),
        LlmBackend::OpenAi => create_openai_provider(config),
    }
}

fn api_key<'a>(config: &'a LlmConfig, provider: &str) -> Result<&'a str, LlmError> {
    config
        .api_key
        .as_ref()
        .map(|k| k.expose_secret())
        .ok_or_else(|| LlmError::RequestFailed {
            provider: provider.to_string(),
            reason: "API key not configured".to_string(),
        })
}

fn create_anthropic_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::anthropic;

    let client: rig::client::Client<anthropic::client::AnthropicExt> =
        anthropic::Client::new(api_key(config, "anthropic")?).map_err(|e| {
            LlmError::RequestFailed {
                provider: "anthropic".to_string(),
                reason: format!("Failed to create Anthropic client: {}", e),
            }
        })?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using Anthropic (model: {})", config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model, "anthropic")))
}

fn create_openai_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::openai;

    let client: rig::client::Client<openai::client::OpenAIResponsesExt> =
        openai::Client::new(api_key(config, "openai")?).map_err(|e| {
            LlmError::RequestFailed {
                provider: "openai".to_string(),
                reason: format!("Failed to create OpenAI client: {}", e),
            }
        })?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using OpenAI (model: {})", config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model, "openai")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_case_insensitively() {
        assert_eq!("Ollama".parse::<LlmBackend>().unwrap(), LlmBackend::Ollama);
        assert_eq!("OPENAI".parse::<LlmBackend>().unwrap(), LlmBackend::OpenAi);
        assert!("bard".parse::<LlmBackend>().is_err());
    }

    #[test]
    fn create_ollama_provider() {
        let config = LlmConfig {
            backend: LlmBackend::Ollama,
            api_key: None,
            model: "phi3:mini".to_string(),
            base_url: "http://localhost:11434".to_string(),
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "phi3:mini");
    }

    #[test]
    fn create_anthropic_provider_with_key() {
        // rig-core clients accept any string as API key at construction time.
        let config = LlmConfig {
            backend: LlmBackend::Anthropic,
            api_key: Some(SecretString::from("test-key")),
            model: "claude-3-5-haiku-latest".to_string(),
            base_url: String::new(),
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_name(), "claude-3-5-haiku-latest");
    }

    #[test]
    fn hosted_backend_without_key_fails() {
        let config = LlmConfig {
            backend: LlmBackend::OpenAi,
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: String::new(),
        };
        assert!(create_provider(&config).is_err());
    }
}
