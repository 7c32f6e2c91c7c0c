//! Intake state machine — which field is next, confirmation, edit mode.

use serde::{Deserialize, Serialize};

/// The closed set of profile fields, in collection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Gender,
    Pin,
    Disability,
    Grievance,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Gender,
        Field::Pin,
        Field::Disability,
        Field::Grievance,
    ];

    /// Lower-case key, as typed by the user in the edit flow.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Gender => "gender",
            Self::Pin => "pin",
            Self::Disability => "disability",
            Self::Grievance => "grievance",
        }
    }

    /// Title-cased label used in summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Gender => "Gender",
            Self::Pin => "Pin",
            Self::Disability => "Disability",
            Self::Grievance => "Grievance",
        }
    }

    /// Case-insensitive lookup of a user-typed field name.
    pub fn parse(input: &str) -> Option<Field> {
        let wanted = input.trim().to_lowercase();
        Self::ALL.into_iter().find(|f| f.key() == wanted)
    }

    /// The onboarding stage that collects this field.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Name => Stage::Name,
            Self::Gender => Stage::Gender,
            Self::Pin => Stage::Pin,
            Self::Disability => Stage::Disability,
            Self::Grievance => Stage::Grievance,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Onboarding stage: the next field to collect, or `Done`.
///
/// Progresses linearly: Name → Gender → Pin → Disability → Grievance → Done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Name,
    Gender,
    Pin,
    Disability,
    Grievance,
    Done,
}

impl Stage {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: Stage) -> bool {
        use Stage::*;
        matches!(
            (self, target),
            (Name, Gender)
                | (Gender, Pin)
                | (Pin, Disability)
                | (Disability, Grievance)
                | (Grievance, Done)
        )
    }

    /// Whether every field has been collected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Get the next stage in the linear progression, if any.
    pub fn next(&self) -> Option<Stage> {
        use Stage::*;
        match self {
            Name => Some(Gender),
            Gender => Some(Pin),
            Pin => Some(Disability),
            Disability => Some(Grievance),
            Grievance => Some(Done),
            Done => None,
        }
    }

    /// The field this stage collects.
    pub fn field(&self) -> Option<Field> {
        match self {
            Self::Name => Some(Field::Name),
            Self::Gender => Some(Field::Gender),
            Self::Pin => Some(Field::Pin),
            Self::Disability => Some(Field::Disability),
            Self::Grievance => Some(Field::Grievance),
            Self::Done => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.field() {
            Some(field) => f.write_str(field.key()),
            None => f.write_str("done"),
        }
    }
}

/// Edit sub-mode. Exactly one variant is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "field", rename_all = "snake_case")]
pub enum EditMode {
    /// Normal onboarding / confirmation flow.
    #[default]
    Inactive,
    /// "edit" was typed; waiting for a field name.
    AwaitingField,
    /// Waiting for the new value of a field.
    Editing(Field),
}

/// The coarse conversation mode, ignoring edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Onboarding(Field),
    AwaitingConfirmation,
    Confirmed,
}

/// Control variables for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueState {
    pub stage: Stage,
    pub confirmed: bool,
    pub edit: EditMode,
}

impl DialogueState {
    /// Advance to the next stage. Returns an error if already done.
    pub fn advance(&mut self) -> Result<Stage, String> {
        let next = self
            .stage
            .next()
            .ok_or_else(|| "Already at terminal stage".to_string())?;
        if !self.stage.can_transition_to(next) {
            return Err(format!("Cannot transition from {} to {}", self.stage, next));
        }
        self.stage = next;
        Ok(next)
    }

    /// Confirmation is only possible once every field is collected.
    pub fn confirm(&mut self) -> Result<(), String> {
        if !self.stage.is_terminal() {
            return Err(format!("Cannot confirm while collecting {}", self.stage));
        }
        self.confirmed = true;
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        match (self.stage.field(), self.confirmed) {
            (_, true) => Mode::Confirmed,
            (Some(field), false) => Mode::Onboarding(field),
            (None, false) => Mode::AwaitingConfirmation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use Stage::*;
        let transitions = [
            (Name, Gender),
            (Gender, Pin),
            (Pin, Disability),
            (Disability, Grievance),
            (Grievance, Done),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn invalid_transitions() {
        use Stage::*;
        // Skip stages
        assert!(!Name.can_transition_to(Pin));
        assert!(!Gender.can_transition_to(Done));
        // Go backward
        assert!(!Pin.can_transition_to(Gender));
        // Terminal
        assert!(!Done.can_transition_to(Name));
        // Self-transition
        assert!(!Name.can_transition_to(Name));
    }

    #[test]
    fn state_advance_walks_all_stages() {
        let mut state = DialogueState::default();
        assert_eq!(state.stage, Stage::Name);

        let expected = [
            Stage::Gender,
            Stage::Pin,
            Stage::Disability,
            Stage::Grievance,
            Stage::Done,
        ];
        for stage in expected {
            assert_eq!(state.advance().unwrap(), stage);
        }
        assert!(state.advance().is_err());
        assert!(state.stage.is_terminal());
    }

    #[test]
    fn confirm_requires_done() {
        let mut state = DialogueState::default();
        assert!(state.confirm().is_err());
        assert!(!state.confirmed);

        state.stage = Stage::Done;
        state.confirm().unwrap();
        assert!(state.confirmed);
        assert_eq!(state.mode(), Mode::Confirmed);
    }

    #[test]
    fn mode_follows_stage_and_confirmation() {
        let mut state = DialogueState::default();
        assert_eq!(state.mode(), Mode::Onboarding(Field::Name));
        state.stage = Stage::Pin;
        assert_eq!(state.mode(), Mode::Onboarding(Field::Pin));
        state.stage = Stage::Done;
        assert_eq!(state.mode(), Mode::AwaitingConfirmation);
    }

    #[test]
    fn field_parse_is_case_insensitive() {
        assert_eq!(Field::parse("PIN"), Some(Field::Pin));
        assert_eq!(Field::parse("  Grievance "), Some(Field::Grievance));
        assert_eq!(Field::parse("postcode"), None);
        assert_eq!(Field::parse(""), None);
    }

    #[test]
    fn field_stage_round_trip() {
        for field in Field::ALL {
            assert_eq!(field.stage().field(), Some(field));
        }
        assert_eq!(Stage::Done.field(), None);
    }

    #[test]
    fn display_matches_serde() {
        let stages = [
            Stage::Name,
            Stage::Gender,
            Stage::Pin,
            Stage::Disability,
            Stage::Grievance,
            Stage::Done,
        ];
        for stage in stages {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(format!("\"{stage}\""), json, "Display and serde should match for {stage:?}");
        }
    }

    #[test]
    fn default_state() {
        let state = DialogueState::default();
        assert_eq!(state.stage, Stage::Name);
        assert!(!state.confirmed);
        assert_eq!(state.edit, EditMode::Inactive);
    }

    #[test]
    fn edit_mode_serde() {
        let json = serde_json::to_value(EditMode::Editing(Field::Pin)).unwrap();
        assert_eq!(json, serde_json::json!({"mode": "editing", "field": "pin"}));
        let json = serde_json::to_value(EditMode::AwaitingField).unwrap();
        assert_eq!(json, serde_json::json!({"mode": "awaiting_field"}));
    }
}
