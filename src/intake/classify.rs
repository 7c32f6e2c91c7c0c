//! Department classification and static routing.

use serde::Serialize;

use super::prompts::classification_prompt;
use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// Destination for labels outside the known set.
pub const DEFAULT_DESTINATION: &str = "General Grievance Cell";

/// The nine departments a grievance can be assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Department {
    Allotment,
    Engineering,
    Land,
    Legal,
    Finance,
    Enforcement,
    Establishment,
    Planning,
    Horticulture,
}

impl Department {
    pub const ALL: [Department; 9] = [
        Department::Allotment,
        Department::Engineering,
        Department::Land,
        Department::Legal,
        Department::Finance,
        Department::Enforcement,
        Department::Establishment,
        Department::Planning,
        Department::Horticulture,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Allotment => "Allotment",
            Self::Engineering => "Engineering",
            Self::Land => "Land",
            Self::Legal => "Legal",
            Self::Finance => "Finance",
            Self::Enforcement => "Enforcement",
            Self::Establishment => "Establishment",
            Self::Planning => "Planning",
            Self::Horticulture => "Horticulture",
        }
    }

    pub fn destination(&self) -> &'static str {
        match self {
            Self::Allotment => "Plot/Flat Allotment Dept",
            Self::Engineering => "Planning Dept",
            Self::Land => "Land Plotting Dept",
            Self::Legal => "Legal Affairs Cell",
            Self::Finance => "Refund & Finance Dept",
            Self::Enforcement => "Construction Enforcement Wing",
            Self::Establishment => "Letter & Dairy Section",
            Self::Planning => "Plan Approval Authority",
            Self::Horticulture => "Greenery & Parks Division",
        }
    }

    /// Exact, case-sensitive label match.
    pub fn from_label(label: &str) -> Option<Department> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of classifying one grievance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// The backend's reply, trimmed. May be outside the known set.
    pub label: String,
    pub department: Option<Department>,
    pub routed_to: &'static str,
}

impl Classification {
    /// Interpret a raw backend reply. Unknown labels route to the default
    /// cell; they are not an error.
    pub fn from_reply(reply: &str) -> Self {
        let label = reply.trim().to_string();
        let department = Department::from_label(&label);
        let routed_to = department
            .map(|d| d.destination())
            .unwrap_or(DEFAULT_DESTINATION);
        Self {
            label,
            department,
            routed_to,
        }
    }
}

/// One-shot classification. The first reply is authoritative.
pub async fn classify(llm: &dyn LlmProvider, grievance: &str) -> Result<Classification, LlmError> {
    let request = CompletionRequest::new(vec![ChatMessage::system(classification_prompt(
        grievance,
    ))]);
    let response = llm.complete(request).await?;
    let classification = Classification::from_reply(&response.content);

    tracing::info!(
        department = %classification.label,
        known = classification.department.is_some(),
        routed_to = classification.routed_to,
        "Grievance classified"
    );
    Ok(classification)
}
