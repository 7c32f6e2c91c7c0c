//! Municipal grievance assistant — chat-driven intake and routing.

pub mod channels;
pub mod config;
pub mod error;
pub mod intake;
pub mod llm;
pub mod logging;
pub mod sentiment;
