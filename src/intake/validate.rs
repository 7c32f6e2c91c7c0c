//! Local field validators. Only gender and pin are checked.

use std::sync::LazyLock;

use regex::Regex;

use super::state::Field;

static PIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{6}$").expect("static PIN pattern"));

/// Exactly "male" or "female", ignoring case and surrounding whitespace.
pub fn is_valid_gender(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "male" | "female")
}

/// Six ASCII digits once spaces are removed.
pub fn is_valid_pin(value: &str) -> bool {
    PIN_RE.is_match(&value.replace(' ', ""))
}

/// Whether `value` is acceptable for `field`. Unchecked fields always pass.
pub fn validate(field: Field, value: &str) -> bool {
    match field {
        Field::Gender => is_valid_gender(value),
        Field::Pin => is_valid_pin(value),
        Field::Name | Field::Disability | Field::Grievance => true,
    }
}
