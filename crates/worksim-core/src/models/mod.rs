pub mod chat;
pub mod content;
pub mod document;
pub mod notification;
pub mod script;

pub use chat::{ChatMessage, ChatRole};
pub use content::{plain_text, ContentBlock};
pub use document::{
    Attachment, Document, DocumentPatch, DraftEmail, DraftEmailPatch, SentEmail,
};
pub use notification::{Notification, NotificationKind, NotificationTemplate, Trigger};
pub use script::{Participant, ScriptLine, TranscriptEntry};
