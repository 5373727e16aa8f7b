//! Chat assistant panel: canned keyword replies and one scripted branch.

pub mod assistant;
pub mod rules;

pub use assistant::{ChatAssistant, ChatDelays, ChatEvent};
pub use rules::{ChatScript, ReplyRule, ScriptedBranch};
