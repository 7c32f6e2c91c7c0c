//! The per-turn rule cascade.
//!
//! `select` picks exactly one rule for an utterance by checking the rules in
//! priority order; the first match wins. `apply` performs the local part of
//! the rule on the session. Rules that need the backend return an `Action`
//! for the controller to carry out.

use super::gate;
use super::model::Session;
use super::prompts;
use super::state::{EditMode, Field, Mode};
use super::validate;
use crate::config::GatePolicy;

/// One step of the cascade, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// 1. "edit" typed at any point.
    StartEdit,
    /// 2a. Valid field named while awaiting a field.
    SelectField(Field),
    /// 2b. Unknown field named while awaiting a field.
    UnknownField,
    /// 3. New value for the field being edited.
    ApplyEdit(Field),
    /// 4. Onboarding value failed its validator.
    RejectValue(Field),
    /// 5. Onboarding value accepted.
    Collect(Field),
    /// 6. "confirm" typed.
    Confirm,
    /// All fields collected, waiting for `edit` or `confirm`.
    AwaitConfirmation,
    /// 7a. Post-confirmation text without grievance keywords.
    GateRejected,
    /// 7b. Post-confirmation text forwarded to the backend.
    Chat,
}

impl Rule {
    pub fn name(&self) -> &'static str {
        match self {
            Self::StartEdit => "start_edit",
            Self::SelectField(_) => "select_field",
            Self::UnknownField => "unknown_field",
            Self::ApplyEdit(_) => "apply_edit",
            Self::RejectValue(_) => "reject_value",
            Self::Collect(_) => "collect",
            Self::Confirm => "confirm",
            Self::AwaitConfirmation => "await_confirmation",
            Self::GateRejected => "gate_rejected",
            Self::Chat => "chat",
        }
    }
}

/// What remains to be done after `apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Scripted reply; the turn is complete.
    Reply(String),
    /// Classify the stored grievance, then confirm.
    Classify { grievance: String },
    /// Forward the conversation to the chat backend.
    Chat,
}

fn is_keyword(utterance: &str, keyword: &str) -> bool {
    utterance.trim().eq_ignore_ascii_case(keyword)
}

/// Pick the rule for `utterance`. Pure: reads the session, changes nothing.
pub fn select(session: &Session, utterance: &str, gate: GatePolicy) -> Rule {
    if is_keyword(utterance, "edit") {
        return Rule::StartEdit;
    }

    match session.state.edit {
        EditMode::AwaitingField => {
            return match Field::parse(utterance) {
                Some(field) => Rule::SelectField(field),
                None => Rule::UnknownField,
            };
        }
        EditMode::Editing(field) => return Rule::ApplyEdit(field),
        EditMode::Inactive => {}
    }

    if let Mode::Onboarding(field) = session.state.mode() {
        return if validate::validate(field, utterance) {
            Rule::Collect(field)
        } else {
            Rule::RejectValue(field)
        };
    }

    if is_keyword(utterance, "confirm") {
        return Rule::Confirm;
    }

    if !session.state.confirmed {
        return Rule::AwaitConfirmation;
    }

    if gate::allows(gate, utterance) {
        Rule::Chat
    } else {
        Rule::GateRejected
    }
}

/// Apply the local effect of `rule`. Validation and selection failures leave
/// the profile and stage untouched.
pub fn apply(rule: Rule, session: &mut Session, utterance: &str) -> Action {
    match rule {
        Rule::StartEdit => {
            session.state.edit = EditMode::AwaitingField;
            Action::Reply(prompts::FIELD_SELECTION_PROMPT.to_string())
        }
        Rule::SelectField(field) => {
            session.state.edit = EditMode::Editing(field);
            Action::Reply(prompts::edit_value_prompt(field))
        }
        Rule::UnknownField => Action::Reply(prompts::unknown_field()),
        Rule::ApplyEdit(field) => {
            session.profile.set(field, utterance);
            session.state.edit = EditMode::Inactive;
            Action::Reply(prompts::edit_applied(field, utterance, &session.profile))
        }
        Rule::RejectValue(field) => Action::Reply(prompts::invalid_value(field)),
        Rule::Collect(field) => {
            session.profile.set(field, utterance);
            match session.state.advance() {
                Ok(next) => match next.field() {
                    Some(next_field) => Action::Reply(prompts::field_prompt(next_field).to_string()),
                    None => Action::Reply(prompts::summary_reply(&session.profile)),
                },
                Err(e) => {
                    tracing::warn!("Failed to advance intake stage: {}", e);
                    Action::Reply(prompts::summary_reply(&session.profile))
                }
            }
        }
        Rule::Confirm => Action::Classify {
            grievance: session.profile.grievance.clone().unwrap_or_default(),
        },
        Rule::AwaitConfirmation => Action::Reply(prompts::AWAITING_CONFIRMATION.to_string()),
        Rule::GateRejected => Action::Reply(prompts::GATE_REJECTION.to_string()),
        Rule::Chat => Action::Chat,
    }
}
