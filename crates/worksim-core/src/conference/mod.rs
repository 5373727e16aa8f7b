//! Simulated video conference: scripted typewriter transcript.

pub mod player;

pub use player::{ConversationPlayer, PlayerConfig, PlayerEvent, PlayerPhase};
