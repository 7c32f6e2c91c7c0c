//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::{LlmBackend, LlmConfig};

/// Default model when `GRIEVANCE_MODEL` is unset.
pub const DEFAULT_MODEL: &str = "phi3:mini";

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Whether free text after confirmation must look like a grievance before
/// it is forwarded to the chat backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatePolicy {
    /// Forward every post-confirmation message.
    #[default]
    Off,
    /// Require at least one grievance keyword.
    Keywords,
}

impl std::str::FromStr for GatePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "off" | "none" => Ok(Self::Off),
            "keywords" | "on" => Ok(Self::Keywords),
            other => Err(ConfigError::InvalidValue {
                key: "GRIEVANCE_KEYWORD_GATE".to_string(),
                message: format!("expected 'off' or 'keywords', got '{other}'"),
            }),
        }
    }
}

/// Dialogue controller configuration.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Keyword gate applied to post-confirmation chat.
    pub gate: GatePolicy,
    /// Upper bound on any single wait for the backend.
    pub backend_timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            gate: GatePolicy::Off,
            backend_timeout: Duration::from_secs(120),
        }
    }
}

/// Everything the binaries read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub assistant: AssistantConfig,
    /// Port for the web chat surface; `None` keeps the terminal only.
    pub http_port: Option<u16>,
    /// Directory for the rolling log file.
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Build configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend: LlmBackend = lookup("GRIEVANCE_BACKEND")
            .unwrap_or_else(|| "ollama".to_string())
            .parse()?;

        let model = lookup("GRIEVANCE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let api_key = match backend {
            LlmBackend::Ollama => None,
            LlmBackend::Anthropic => Some(required_secret(&lookup, "ANTHROPIC_API_KEY")?),
            LlmBackend::OpenAi => Some(required_secret(&lookup, "OPENAI_API_KEY")?),
        };

        let base_url = lookup("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        let gate = lookup("GRIEVANCE_KEYWORD_GATE")
            .map(|s| s.parse())
            .transpose()?
            .unwrap_or_default();

        let backend_timeout = match lookup("GRIEVANCE_BACKEND_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number(
                "GRIEVANCE_BACKEND_TIMEOUT_SECS",
                &raw,
            )?),
            None => AssistantConfig::default().backend_timeout,
        };

        let http_port = lookup("GRIEVANCE_HTTP_PORT")
            .map(|raw| parse_number("GRIEVANCE_HTTP_PORT", &raw))
            .transpose()?;

        let log_dir = lookup("GRIEVANCE_LOG_DIR").map(PathBuf::from);

        Ok(Self {
            llm: LlmConfig {
                backend,
                api_key,
                model,
                base_url,
            },
            assistant: AssistantConfig {
                gate,
                backend_timeout,
            },
            http_port,
            log_dir,
        })
    }
}

fn required_secret<F>(lookup: &F, key: &str) -> Result<SecretString, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("'{raw}' is not a valid number"),
    })
}
