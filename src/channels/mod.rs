//! Chat surfaces — where utterances come from and replies go.
//!
//! A surface delivers raw user input, renders the transcript, and shows
//! streamed reply fragments as they arrive.

pub mod cli;

pub use cli::CliChannel;

use async_trait::async_trait;

use crate::error::ChannelError;
use crate::intake::Session;

/// One thing the user did at the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// A chat utterance, untrimmed.
    Utterance(String),
    /// The reset trigger.
    Reset,
}

/// Live placeholder for a reply that is still streaming.
pub trait ReplySink: Send {
    fn fragment(&mut self, text: &str);
}

/// Discards fragments.
pub struct NullSink;

impl ReplySink for NullSink {
    fn fragment(&mut self, _text: &str) {}
}

/// Collects fragments in arrival order.
impl ReplySink for Vec<String> {
    fn fragment(&mut self, text: &str) {
        self.push(text.to_string());
    }
}

/// An interactive chat surface driven by `DialogueController::run`.
#[async_trait]
pub trait ChatSurface: ReplySink {
    fn name(&self) -> &str;

    /// Wait for the next input. `None` ends the conversation.
    async fn next_input(&mut self) -> Result<Option<UserInput>, ChannelError>;

    /// Show the whole session (on start and after reset).
    async fn render(&mut self, session: &Session) -> Result<(), ChannelError>;

    /// Show the final reply of a turn. `streamed` is true when its text was
    /// already delivered through `ReplySink::fragment`.
    async fn respond(&mut self, reply: &str, streamed: bool) -> Result<(), ChannelError>;
}
