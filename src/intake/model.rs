//! Profile, transcript, and the session that owns them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::{DialogueState, Field};
use crate::llm::ChatMessage;

/// Rendered in summaries for a field that has not been collected.
pub const UNSET_VALUE: &str = "(not provided)";

/// The five-field record collected from the user. Values are stored as the
/// raw text the user typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub pin: Option<String>,
    pub disability: Option<String>,
    pub grievance: Option<String>,
}

impl Profile {
    pub fn get(&self, field: Field) -> Option<&str> {
        let slot = match field {
            Field::Name => &self.name,
            Field::Gender => &self.gender,
            Field::Pin => &self.pin,
            Field::Disability => &self.disability,
            Field::Grievance => &self.grievance,
        };
        slot.as_deref()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Gender => &mut self.gender,
            Field::Pin => &mut self.pin,
            Field::Disability => &mut self.disability,
            Field::Grievance => &mut self.grievance,
        };
        *slot = Some(value.into());
    }

    /// Markdown list of all five fields, in collection order.
    pub fn summary(&self) -> String {
        Field::ALL
            .iter()
            .map(|f| format!("- **{}**: {}", f.label(), self.get(*f).unwrap_or(UNSET_VALUE)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Who spoke a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Speaker,
    pub content: String,
    pub at: DateTime<Utc>,
}

/// Append-only, role-tagged conversation history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn push(&mut self, role: Speaker, content: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            role,
            content: content.into(),
            at: Utc::now(),
        });
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Speaker::User, content);
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Speaker::Assistant, content);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Backend view of the conversation.
    pub fn to_chat_messages(&self) -> Vec<ChatMessage> {
        self.entries
            .iter()
            .map(|e| match e.role {
                Speaker::User => ChatMessage::user(&e.content),
                Speaker::Assistant => ChatMessage::assistant(&e.content),
            })
            .collect()
    }
}

/// Everything one conversation owns. Replaced as a whole on reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub transcript: Transcript,
    pub profile: Profile,
    pub state: DialogueState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            transcript: Transcript::default(),
            profile: Profile::default(),
            state: DialogueState::default(),
        }
    }

    /// Clear transcript, profile, and dialogue state in one assignment.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Name for the welcome line.
    pub fn display_name(&self) -> &str {
        self.profile
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("USER")
    }
}
