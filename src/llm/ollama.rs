//! Ollama backend using the native ollama-rs SDK.

use async_trait::async_trait;
use ollama_rs::Ollama;
use ollama_rs::generation::chat::ChatMessage as OllamaMessage;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::models::ModelOptions;
use tokio_stream::StreamExt;

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, CompletionRequest, CompletionResponse, FragmentStream, LlmProvider, Role,
};

const PROVIDER: &str = "ollama";
const DEFAULT_PORT: u16 = 11434;

/// Local inference through an Ollama server.
pub struct OllamaProvider {
    client: Ollama,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: impl Into<String>) -> Self {
        Self {
            client: Self::create_client(base_url),
            base_url: base_url.to_string(),
            model: model.into(),
        }
    }

    /// `Ollama::new` takes host and port separately.
    fn create_client(base_url: &str) -> Ollama {
        match reqwest::Url::parse(base_url) {
            Ok(parsed) => {
                let host = parsed.host_str().unwrap_or("localhost");
                let port = parsed.port().unwrap_or(DEFAULT_PORT);
                Ollama::new(format!("{}://{}", parsed.scheme(), host), port)
            }
            Err(e) => {
                tracing::warn!(base_url, error = %e, "Unparseable Ollama URL, using default");
                Ollama::default()
            }
        }
    }

    fn build_request(&self, request: &CompletionRequest) -> ChatMessageRequest {
        let messages = request.messages.iter().map(convert_message).collect();
        let mut chat = ChatMessageRequest::new(self.model.clone(), messages);

        let mut options = ModelOptions::default();
        let mut has_options = false;
        if let Some(temperature) = request.temperature {
            options = options.temperature(temperature);
            has_options = true;
        }
        if let Some(max_tokens) = request.max_tokens {
            options = options.num_predict(max_tokens as i32);
            has_options = true;
        }
        if has_options {
            chat = chat.options(options);
        }
        chat
    }

    fn map_error(&self, e: impl std::fmt::Display) -> LlmError {
        let msg = e.to_string();
        if msg.contains("connect") || msg.contains("Connection refused") {
            LlmError::BackendUnavailable {
                provider: PROVIDER.to_string(),
                reason: format!("Cannot connect to Ollama at {}: {}", self.base_url, msg),
            }
        } else if msg.contains("not found") || msg.contains("404") {
            LlmError::ModelNotAvailable {
                provider: PROVIDER.to_string(),
                model: self.model.clone(),
            }
        } else {
            LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: msg,
            }
        }
    }
}

fn convert_message(message: &ChatMessage) -> OllamaMessage {
    match message.role {
        Role::System => OllamaMessage::system(message.content.clone()),
        Role::User => OllamaMessage::user(message.content.clone()),
        Role::Assistant => OllamaMessage::assistant(message.content.clone()),
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let response = self
            .client
            .send_chat_messages(self.build_request(&request))
            .await
            .map_err(|e| self.map_error(e))?;

        Ok(CompletionResponse {
            content: response.message.content,
        })
    }

    async fn stream(&self, request: CompletionRequest) -> Result<FragmentStream, LlmError> {
        let stream = self
            .client
            .send_chat_messages_stream(self.build_request(&request))
            .await
            .map_err(|e| self.map_error(e))?;

        let fragments = stream.map(|chunk| match chunk {
            Ok(response) => Ok(response.message.content),
            Err(_) => Err(LlmError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: "Stream error from Ollama".to_string(),
            }),
        });

        Ok(Box::pin(fragments))
    }
}
