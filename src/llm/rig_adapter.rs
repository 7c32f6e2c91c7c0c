//! Bridges a rig-core `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::agent::AgentBuilder;
use rig::completion::{Chat, CompletionModel, Message};

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, CompletionResponse, LlmProvider, Role};

/// Hosted providers reject requests without an explicit token cap.
const DEFAULT_MAX_TOKENS: u64 = 1024;

/// Adapter over any rig completion model (Anthropic, OpenAI).
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
    provider: &'static str,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str, provider: &'static str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            provider,
        }
    }
}

/// Split provider-neutral messages into rig's (preamble, history, prompt).
///
/// System messages are joined into the preamble. The final user message is
/// the prompt; everything before it is history. A request made only of
/// system messages is sent with the system text as the prompt.
pub(crate) fn split_messages(messages: &[ChatMessage]) -> (String, Vec<Message>, String) {
    let preamble = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut turns: Vec<&ChatMessage> = messages.iter().filter(|m| m.role != Role::System).collect();

    let prompt = match turns.last() {
        Some(last) if last.role == Role::User => {
            let text = last.content.clone();
            turns.pop();
            text
        }
        _ if turns.is_empty() => return (String::new(), Vec::new(), preamble),
        _ => "Please continue.".to_string(),
    };

    let history = turns
        .into_iter()
        .map(|m| match m.role {
            Role::Assistant => Message::assistant(m.content.clone()),
            _ => Message::user(m.content.clone()),
        })
        .collect();

    (preamble, history, prompt)
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let (preamble, history, prompt) = split_messages(&request.messages);

        let mut builder = AgentBuilder::new(self.model.clone())
            .max_tokens(request.max_tokens.map(u64::from).unwrap_or(DEFAULT_MAX_TOKENS));
        if !preamble.is_empty() {
            builder = builder.preamble(&preamble);
        }
        if let Some(temperature) = request.temperature {
            builder = builder.temperature(f64::from(temperature));
        }
        let agent = builder.build();

        let content = agent
            .chat(prompt, history)
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: self.provider.to_string(),
                reason: e.to_string(),
            })?;

        Ok(CompletionResponse { content })
    }
}
