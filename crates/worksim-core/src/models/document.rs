use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::content::{plain_text, ContentBlock};
use crate::constants::{
    DOCUMENTS_KEY, DOCUMENT_ID_PREFIX, DRAFTS_KEY, DRAFT_ID_PREFIX, SENT_EMAILS_KEY,
    SENT_ID_PREFIX, UNTITLED,
};
use crate::store::Record;

/// Derive a title from the first line of text (truncated to 50 chars)
fn derive_title(text: &str) -> String {
    let title = text
        .lines()
        .next()
        .unwrap_or_default()
        .chars()
        .take(50)
        .collect::<String>()
        .trim()
        .to_string();

    if title.is_empty() { UNTITLED.to_string() } else { title }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

// =============================================================================
// Document
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// New unsaved document; the store assigns the id. A blank title is
    /// derived from the first content line.
    pub fn new(title: impl Into<String>, content: Vec<ContentBlock>) -> Self {
        let now = Utc::now();
        let mut title = title.into();
        if title.trim().is_empty() {
            title = derive_title(&plain_text(&content));
        }
        Self {
            id: String::new(),
            title,
            content,
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// First 100 chars of the body on one line
    pub fn preview(&self) -> String {
        plain_text(&self.content)
            .chars()
            .take(100)
            .collect::<String>()
            .replace('\n', " ")
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentPatch {
    pub title: Option<String>,
    pub content: Option<Vec<ContentBlock>>,
    pub attachments: Option<Vec<Attachment>>,
}

impl Record for Document {
    type Patch = DocumentPatch;
    const STORAGE_KEY: &'static str = DOCUMENTS_KEY;
    const ID_PREFIX: &'static str = DOCUMENT_ID_PREFIX;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: DocumentPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(attachments) = patch.attachments {
            self.attachments = attachments;
        }
        self.updated_at = now;
    }
}

// =============================================================================
// DraftEmail
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftEmail {
    pub id: String,
    pub subject: String,
    pub recipients: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    pub body: Vec<ContentBlock>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DraftEmail {
    pub fn new(subject: impl Into<String>, recipients: Vec<String>, body: Vec<ContentBlock>) -> Self {
        let now = Utc::now();
        Self {
            id: String::new(),
            subject: subject.into(),
            recipients,
            cc: Vec::new(),
            body,
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subject.trim().is_empty()
            && self.recipients.is_empty()
            && self.cc.is_empty()
            && self.body.is_empty()
            && self.attachments.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DraftEmailPatch {
    pub subject: Option<String>,
    pub recipients: Option<Vec<String>>,
    pub cc: Option<Vec<String>>,
    pub body: Option<Vec<ContentBlock>>,
    pub attachments: Option<Vec<Attachment>>,
}

impl Record for DraftEmail {
    type Patch = DraftEmailPatch;
    const STORAGE_KEY: &'static str = DRAFTS_KEY;
    const ID_PREFIX: &'static str = DRAFT_ID_PREFIX;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: DraftEmailPatch, now: DateTime<Utc>) {
        if let Some(subject) = patch.subject {
            self.subject = subject;
        }
        if let Some(recipients) = patch.recipients {
            self.recipients = recipients;
        }
        if let Some(cc) = patch.cc {
            self.cc = cc;
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(attachments) = patch.attachments {
            self.attachments = attachments;
        }
        self.updated_at = now;
    }
}

// =============================================================================
// SentEmail - immutable once sent
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentEmail {
    pub id: String,
    pub subject: String,
    pub recipients: Vec<String>,
    pub cc: Vec<String>,
    pub body: Vec<ContentBlock>,
    pub attachments: Vec<Attachment>,
    pub sent_at: DateTime<Utc>,
}

impl SentEmail {
    pub fn from_draft(draft: DraftEmail, sent_at: DateTime<Utc>) -> Self {
        Self {
            id: String::new(),
            subject: draft.subject,
            recipients: draft.recipients,
            cc: draft.cc,
            body: draft.body,
            attachments: draft.attachments,
            sent_at,
        }
    }
}

impl Record for SentEmail {
    type Patch = std::convert::Infallible;
    const STORAGE_KEY: &'static str = SENT_EMAILS_KEY;
    const ID_PREFIX: &'static str = SENT_ID_PREFIX;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn apply(&mut self, patch: Self::Patch, _now: DateTime<Utc>) {
        match patch {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_title_is_derived_from_content() {
        let doc = Document::new(
            "  ",
            vec![ContentBlock::paragraph("Rencana engagement Q3\nDetail")],
        );
        assert_eq!(doc.title, "Rencana engagement Q3");

        let empty = Document::new("", Vec::new());
        assert_eq!(empty.title, UNTITLED);
    }

    #[test]
    fn test_preview_is_single_line_and_truncated() {
        let long = "x".repeat(150);
        let doc = Document::new(
            "Judul",
            vec![ContentBlock::paragraph("a\nb"), ContentBlock::paragraph(long)],
        );
        let preview = doc.preview();
        assert!(!preview.contains('\n'));
        assert_eq!(preview.chars().count(), 100);
        assert!(preview.starts_with("a b"));
    }

    #[test]
    fn test_patch_touches_only_given_fields() {
        let mut draft = DraftEmail::new("Halo", vec!["a@contoh.id".into()], Vec::new());
        let created = draft.created_at;
        let later = created + chrono::Duration::seconds(5);
        draft.apply(
            DraftEmailPatch {
                subject: Some("Halo lagi".into()),
                ..Default::default()
            },
            later,
        );
        assert_eq!(draft.subject, "Halo lagi");
        assert_eq!(draft.recipients, vec!["a@contoh.id".to_string()]);
        assert_eq!(draft.created_at, created);
        assert_eq!(draft.updated_at, later);
    }

    #[test]
    fn test_empty_draft() {
        assert!(DraftEmail::new(" ", Vec::new(), Vec::new()).is_empty());
        assert!(!DraftEmail::new("", vec!["x@y.id".into()], Vec::new()).is_empty());
    }
}
