//! DialogueController — runs one turn of the intake conversation.
//!
//! A turn takes the current session and one utterance and produces the next
//! session plus the assistant's reply. The caller swaps the session in only
//! after the turn finishes, so a half-applied turn is never observable.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::classify::{Classification, classify};
use super::model::Session;
use super::prompts;
use super::rules::{self, Action, Rule};
use crate::channels::{ChatSurface, ReplySink, UserInput};
use crate::config::AssistantConfig;
use crate::error::{ChannelError, LlmError};
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// Result of one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The session after the turn.
    pub session: Session,
    /// The assistant entry appended to the transcript.
    pub reply: String,
    /// Which rule handled the utterance.
    pub rule: Rule,
    /// Whether the reply was delivered through the sink as it arrived.
    pub streamed: bool,
}

/// Drives the intake conversation against a backend.
pub struct DialogueController {
    llm: Arc<dyn LlmProvider>,
    config: AssistantConfig,
}

impl DialogueController {
    pub fn new(llm: Arc<dyn LlmProvider>, config: AssistantConfig) -> Self {
        Self { llm, config }
    }

    /// Add the greeting to an empty, unconfirmed session.
    pub fn greet(&self, session: &mut Session) {
        if session.transcript.is_empty() && !session.state.confirmed {
            session.transcript.push_assistant(prompts::GREETING);
        }
    }

    /// Process one utterance to completion.
    ///
    /// Streamed fragments of a chat reply are pushed to `sink` in arrival
    /// order; the stored reply is their concatenation.
    pub async fn handle_turn(
        &self,
        session: &Session,
        utterance: &str,
        sink: &mut dyn ReplySink,
    ) -> TurnOutcome {
        let mut next = session.clone();
        next.transcript.push_user(utterance);

        let rule = rules::select(&next, utterance, self.config.gate);
        info!(
            session_id = %next.id,
            rule = rule.name(),
            stage = %next.state.stage,
            utterance_len = utterance.len(),
            "Dialogue turn"
        );

        let (reply, streamed) = match rules::apply(rule, &mut next, utterance) {
            Action::Reply(text) => (text, false),
            Action::Classify { grievance } => (self.confirm(&mut next, &grievance).await, false),
            Action::Chat => self.chat(&next, sink).await,
        };

        next.transcript.push_assistant(&reply);
        TurnOutcome {
            session: next,
            reply,
            rule,
            streamed,
        }
    }

    /// Classify the grievance and mark the session confirmed. On failure the
    /// session stays unconfirmed so `confirm` can be retried.
    async fn confirm(&self, session: &mut Session, grievance: &str) -> String {
        match self.classify_with_timeout(grievance).await {
            Ok(classification) => {
                if let Err(e) = session.state.confirm() {
                    warn!(session_id = %session.id, "Unexpected confirm: {}", e);
                }
                prompts::classification_reply(&classification)
            }
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "Classification failed");
                prompts::classification_unavailable()
            }
        }
    }

    async fn classify_with_timeout(&self, grievance: &str) -> Result<Classification, LlmError> {
        let limit = self.config.backend_timeout;
        timeout(limit, classify(self.llm.as_ref(), grievance))
            .await
            .map_err(|_| self.timeout_error(limit))?
    }

    /// Forward the conversation and drain the reply stream.
    async fn chat(&self, session: &Session, sink: &mut dyn ReplySink) -> (String, bool) {
        let mut messages = vec![ChatMessage::system(prompts::chat_system_prompt(
            &session.profile,
        ))];
        messages.extend(session.transcript.to_chat_messages());
        let request = CompletionRequest::new(messages);

        let mut accumulated = String::new();
        let result = self.drain(request, sink, &mut accumulated).await;
        let streamed = !accumulated.is_empty();

        match result {
            Ok(()) => {
                debug!(session_id = %session.id, reply_len = accumulated.len(), "Chat reply complete");
                (accumulated, streamed)
            }
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "Chat backend failed");
                if streamed {
                    // Keep what was shown; append the notice to both views.
                    let notice = format!("\n\n{}", prompts::backend_unavailable());
                    sink.fragment(&notice);
                    accumulated.push_str(&notice);
                    (accumulated, true)
                } else {
                    (prompts::backend_unavailable(), false)
                }
            }
        }
    }

    async fn drain(
        &self,
        request: CompletionRequest,
        sink: &mut dyn ReplySink,
        accumulated: &mut String,
    ) -> Result<(), LlmError> {
        let limit = self.config.backend_timeout;
        let mut stream = timeout(limit, self.llm.stream(request))
            .await
            .map_err(|_| self.timeout_error(limit))??;

        loop {
            match timeout(limit, stream.next()).await {
                Ok(Some(Ok(fragment))) => {
                    if fragment.is_empty() {
                        continue;
                    }
                    sink.fragment(&fragment);
                    accumulated.push_str(&fragment);
                }
                Ok(Some(Err(e))) => return Err(e),
                Ok(None) => return Ok(()),
                Err(_) => return Err(self.timeout_error(limit)),
            }
        }
    }

    fn timeout_error(&self, limit: Duration) -> LlmError {
        LlmError::Timeout {
            provider: self.llm.model_name().to_string(),
            timeout: limit,
        }
    }

    /// Run a whole conversation on an interactive surface until it closes.
    pub async fn run<S: ChatSurface>(&self, surface: &mut S) -> Result<(), ChannelError> {
        let mut session = Session::new();
        self.greet(&mut session);
        surface.render(&session).await?;
        info!(surface = surface.name(), session_id = %session.id, "Conversation started");

        while let Some(input) = surface.next_input().await? {
            match input {
                UserInput::Reset => {
                    session.reset();
                    self.greet(&mut session);
                    info!(session_id = %session.id, "Session reset");
                    surface.render(&session).await?;
                }
                UserInput::Utterance(text) => {
                    let outcome = self.handle_turn(&session, &text, &mut *surface).await;
                    session = outcome.session;
                    surface.respond(&outcome.reply, outcome.streamed).await?;
                }
            }
        }

        info!(surface = surface.name(), "Conversation ended");
        Ok(())
    }
}
