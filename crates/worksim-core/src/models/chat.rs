use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::content::ContentBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: Vec<ContentBlock>,
    /// Simulation-clock offset in milliseconds
    pub sent_at: u64,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>, sent_at: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: ChatRole::User,
            content: vec![ContentBlock::paragraph(text)],
            sent_at,
        }
    }

    pub fn assistant(content: Vec<ContentBlock>, sent_at: u64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: ChatRole::Assistant,
            content,
            sent_at,
        }
    }
}
