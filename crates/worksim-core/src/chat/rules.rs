use crate::models::{ContentBlock, NotificationTemplate};

/// Canned reply chosen when the input contains `keyword` (any case)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRule {
    pub keyword: String,
    pub reply: Vec<ContentBlock>,
}

impl ReplyRule {
    pub fn new(keyword: impl Into<String>, reply: Vec<ContentBlock>) -> Self {
        Self {
            keyword: keyword.into().to_lowercase(),
            reply,
        }
    }

    pub fn matches(&self, input_lower: &str) -> bool {
        input_lower.contains(&self.keyword)
    }
}

/// The one multi-turn conversation the assistant plays, at most once per
/// session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedBranch {
    pub trigger_phrase: String,
    /// Chatting while this document is open also starts the branch
    pub document_id: Option<String>,
    pub first: Vec<ContentBlock>,
    pub second: Vec<ContentBlock>,
    /// Raised together with the second part
    pub notification: NotificationTemplate,
}

impl ScriptedBranch {
    pub fn matches(&self, input: &str, page: Option<&str>) -> bool {
        if input.trim() == self.trigger_phrase.trim() {
            return true;
        }
        matches!((page, self.document_id.as_deref()), (Some(page), Some(doc)) if page == doc)
    }
}

/// Everything the assistant can say
#[derive(Debug, Clone, Default)]
pub struct ChatScript {
    /// Checked in order; the first match wins
    pub rules: Vec<ReplyRule>,
    pub fallbacks: Vec<Vec<ContentBlock>>,
    pub branch: Option<ScriptedBranch>,
}

impl ChatScript {
    pub fn matching_rule(&self, input: &str) -> Option<&ReplyRule> {
        let lower = input.to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&lower))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationKind;

    fn script() -> ChatScript {
        ChatScript {
            rules: vec![
                ReplyRule::new("ringkasan", vec![ContentBlock::paragraph("summary")]),
                ReplyRule::new("cari", vec![ContentBlock::paragraph("find")]),
                ReplyRule::new("Jelaskan", vec![ContentBlock::paragraph("explain")]),
            ],
            fallbacks: Vec::new(),
            branch: None,
        }
    }

    fn keyword(script: &ChatScript, input: &str) -> Option<String> {
        script.matching_rule(input).map(|r| r.keyword.clone())
    }

    #[test]
    fn test_substring_match_ignores_case() {
        let script = script();
        assert_eq!(keyword(&script, "Tolong RINGKASAN dokumen ini").as_deref(), Some("ringkasan"));
        assert_eq!(keyword(&script, "bisa jelaskan?").as_deref(), Some("jelaskan"));
        assert_eq!(keyword(&script, "halo"), None);
    }

    #[test]
    fn test_first_rule_wins() {
        let script = script();
        assert_eq!(
            keyword(&script, "cari lalu buat ringkasan").as_deref(),
            Some("ringkasan")
        );
    }

    #[test]
    fn test_branch_matches_phrase_or_page() {
        let branch = ScriptedBranch {
            trigger_phrase: "Saya belum punya ide".into(),
            document_id: Some("doc-engagement".into()),
            first: Vec::new(),
            second: Vec::new(),
            notification: NotificationTemplate::new(NotificationKind::Chat, "t", "m"),
        };
        assert!(branch.matches("  Saya belum punya ide ", None));
        assert!(!branch.matches("saya belum punya ide", None));
        assert!(!branch.matches("Saya belum punya ide, tolong", None));
        assert!(branch.matches("apa saja", Some("doc-engagement")));
        assert!(!branch.matches("apa saja", Some("doc-lain")));
    }
}
