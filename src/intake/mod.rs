//! Grievance intake — the conversational form.
//!
//! The assistant collects five fields in a fixed order (name, gender, PIN,
//! disability, grievance), lets the user correct any of them with `edit`,
//! and on `confirm` classifies the grievance into a department. After
//! confirmation further messages are forwarded to the chat backend.

pub mod classify;
pub mod controller;
pub mod gate;
pub mod model;
pub mod prompts;
pub mod routes;
pub mod rules;
pub mod state;
pub mod validate;

pub use classify::{Classification, DEFAULT_DESTINATION, Department};
pub use controller::{DialogueController, TurnOutcome};
pub use model::{Profile, Session, Speaker, Transcript, TranscriptEntry};
pub use routes::{ChatRouteState, SessionSnapshot, chat_routes};
pub use rules::{Action, Rule};
pub use state::{DialogueState, EditMode, Field, Mode, Stage};
