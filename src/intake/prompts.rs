//! Scripted replies and backend prompts for the intake conversation.

use super::classify::{Classification, Department};
use super::model::Profile;
use super::state::Field;

/// Shown whenever a fresh session has an empty transcript.
pub const GREETING: &str = "Hello there! Greetings from The Municipal Grievance Assistant. \
How can I help you today?\nBefore that, what should I call you?";

pub const FIELD_SELECTION_PROMPT: &str =
    "Which field would you like to update? (name, gender, pin, disability, grievance)";

pub const AWAITING_CONFIRMATION: &str =
    "Your details are ready. Type `edit` to change anything, or `confirm` to continue.";

pub const GATE_REJECTION: &str = "I can only help with municipal grievances here. \
Please describe the problem (for example a broken streetlight, garbage collection, \
water supply, or a pending refund), or type `edit` to update your details.";

/// Question asked when onboarding reaches `field`.
pub fn field_prompt(field: Field) -> &'static str {
    match field {
        Field::Name => "Hi! What should I call you?",
        Field::Gender => "What's your gender?",
        Field::Pin => "What's your postal PIN code?",
        Field::Disability => "Do you have any disability? (Yes/No)",
        Field::Grievance => "Any grievance you'd like to share?",
    }
}

pub fn edit_value_prompt(field: Field) -> String {
    format!("What should I update **{field}** to?")
}

pub fn unknown_field() -> String {
    let valid = Field::ALL
        .iter()
        .map(|f| format!("`{f}`"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("I couldn't find that field. Try one of: {valid}")
}

pub fn invalid_value(field: Field) -> String {
    format!("That doesn't look like a valid {field}. Please check and try again.")
}

/// Summary shown when onboarding completes.
pub fn summary_reply(profile: &Profile) -> String {
    format!(
        "Here's your info:\n\n{}\n\nType `edit` to change anything, or `confirm` to continue.",
        profile.summary()
    )
}

/// Acknowledgement after an edit, with the current profile.
pub fn edit_applied(field: Field, value: &str, profile: &Profile) -> String {
    format!(
        "Updated **{field}** to: {value}\n\nHere's your info:\n\n{}\n\n\
Type `edit` to change another field, or `confirm` to continue.",
        profile.summary()
    )
}

pub fn classification_reply(classification: &Classification) -> String {
    format!(
        "You've confirmed your information. Thank you!\n\n\
Grievance classified under: **{}**\n\
Routed to: **{}**\n\n\
You can now:\n\
- Type `edit` to update any info\n\
- Type a new grievance to log another issue",
        classification.label, classification.routed_to
    )
}

/// Instruction prompt for the one-shot classifier.
pub fn classification_prompt(grievance: &str) -> String {
    let departments = Department::ALL
        .iter()
        .map(|d| format!("- {d}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "You are a grievance classifier. Based on the user's message, assign it to one of these departments:\n\
{departments}\n\n\
User's grievance: \"{grievance}\"\n\
Respond with only the department name."
    )
}

/// System message for post-confirmation chat.
pub fn chat_system_prompt(profile: &Profile) -> String {
    format!(
        "You are the Municipal Grievance Assistant, helping a citizen register and follow up \
on civic grievances.\n\n\
The citizen's details:\n{}\n\n\
Guidelines:\n\
- Be concise and polite.\n\
- Check the details conversationally. If a value looks invalid (for example a PIN code \
that is not six digits), say so and suggest a correction; the user can type `edit` to change it.\n\
- If the user describes a new problem, help them state it clearly as a grievance.",
        profile.summary()
    )
}

/// Shown when a backend call fails. The session carries on.
pub fn backend_unavailable() -> String {
    "Sorry, I couldn't reach the assistant service just now. Please try again in a moment."
        .to_string()
}

/// Shown when classification fails; `confirm` can be retyped to retry.
pub fn classification_unavailable() -> String {
    format!(
        "{} Your details are saved; type `confirm` to try again.",
        backend_unavailable()
    )
}
