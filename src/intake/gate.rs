//! Keyword gate for post-confirmation chat.
//!
//! When enabled, free text must mention something grievance-like before it
//! is forwarded to the backend. Matching is whole-word and case-insensitive.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::GatePolicy;

/// Words that mark a message as a grievance.
pub const GRIEVANCE_KEYWORDS: &[&str] = &[
    "complaint",
    "complain",
    "grievance",
    "issue",
    "problem",
    "broken",
    "damaged",
    "garbage",
    "waste",
    "drain",
    "drainage",
    "sewage",
    "water",
    "leak",
    "road",
    "pothole",
    "streetlight",
    "light",
    "park",
    "tree",
    "encroachment",
    "construction",
    "plot",
    "flat",
    "allotment",
    "land",
    "refund",
    "payment",
    "fee",
    "legal",
    "noise",
    "delay",
    "pending",
    "status",
];

static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = GRIEVANCE_KEYWORDS.join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})s?\b")).expect("static keyword pattern")
});

/// Whether `text` contains a grievance keyword.
pub fn mentions_grievance(text: &str) -> bool {
    KEYWORD_RE.is_match(text)
}

/// Whether `text` may be forwarded under `policy`.
pub fn allows(policy: GatePolicy, text: &str) -> bool {
    match policy {
        GatePolicy::Off => true,
        GatePolicy::Keywords => mentions_grievance(text),
    }
}
