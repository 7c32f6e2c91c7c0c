//! Error types for the grievance assistant.

use std::time::Duration;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Chat surface errors (terminal, web socket).
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Invalid message format: {0}")]
    InvalidMessage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Backend (language model) errors.
///
/// Every variant counts as a backend-call failure for the dialogue
/// controller, which recovers by telling the user instead of aborting.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Backend {provider} unavailable: {reason}")]
    BackendUnavailable { provider: String, reason: String },

    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("Model {model} not available on provider {provider}")]
    ModelNotAvailable { provider: String, model: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
