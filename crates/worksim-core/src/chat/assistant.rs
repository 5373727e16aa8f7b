use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::rules::ChatScript;
use crate::config::SimulationTiming;
use crate::models::{ChatMessage, ContentBlock, NotificationTemplate};
use crate::scheduler::{as_millis, Timers};

const DEFAULT_FALLBACK: &str = "Maaf, saya belum bisa membantu untuk itu.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatDelays {
    /// Before the first scripted part
    pub thinking: Duration,
    /// Between the two scripted parts
    pub followup: Duration,
    /// Before keyword and fallback replies
    pub reply: Duration,
}

impl ChatDelays {
    pub fn from_timing(timing: &SimulationTiming) -> Self {
        Self {
            thinking: timing.chat_thinking(),
            followup: timing.chat_followup(),
            reply: timing.chat_reply(),
        }
    }
}

impl Default for ChatDelays {
    fn default() -> Self {
        Self::from_timing(&SimulationTiming::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    BotMessage(ChatMessage),
    /// Host should push this into the notification sequencer at `at`
    RaiseNotification {
        template: NotificationTemplate,
        at: Duration,
    },
}

struct PendingReply {
    content: Vec<ContentBlock>,
    notify: Option<NotificationTemplate>,
}

/// Keyword-matching chat assistant with one scripted branch
pub struct ChatAssistant {
    script: ChatScript,
    delays: ChatDelays,
    open: bool,
    minimized: bool,
    messages: Vec<ChatMessage>,
    scripted_played: bool,
    next_reply: u64,
    pending: Vec<(u64, PendingReply)>,
    timers: Timers<u64>,
    rng: StdRng,
}

impl ChatAssistant {
    pub fn new(script: ChatScript, delays: ChatDelays) -> Self {
        Self::with_rng(script, delays, StdRng::from_entropy())
    }

    /// Deterministic fallback selection
    pub fn with_seed(script: ChatScript, delays: ChatDelays, seed: u64) -> Self {
        Self::with_rng(script, delays, StdRng::seed_from_u64(seed))
    }

    fn with_rng(script: ChatScript, delays: ChatDelays, rng: StdRng) -> Self {
        Self {
            script,
            delays,
            open: false,
            minimized: false,
            messages: Vec::new(),
            scripted_played: false,
            next_reply: 0,
            pending: Vec::new(),
            timers: Timers::new(),
            rng,
        }
    }

    // ===== Panel =====

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub fn open(&mut self) {
        self.open = true;
        self.minimized = false;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn minimize(&mut self) {
        if self.open {
            self.minimized = true;
        }
    }

    pub fn expand(&mut self) {
        self.minimized = false;
    }

    // ===== Conversation =====

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn scripted_played(&self) -> bool {
        self.scripted_played
    }

    pub fn is_thinking(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Keyword reply for `input`, or a random fallback
    pub fn reply_for(&mut self, input: &str) -> Vec<ContentBlock> {
        if let Some(rule) = self.script.matching_rule(input) {
            return rule.reply.clone();
        }
        if self.script.fallbacks.is_empty() {
            return vec![ContentBlock::paragraph(DEFAULT_FALLBACK)];
        }
        let idx = self.rng.gen_range(0..self.script.fallbacks.len());
        self.script.fallbacks[idx].clone()
    }

    /// Record a user message and schedule the reply. `page` is the document
    /// the participant has open, if any. Blank input is ignored.
    pub fn submit(&mut self, input: &str, page: Option<&str>, now: Duration) -> Option<ChatMessage> {
        let text = input.trim();
        if text.is_empty() {
            return None;
        }

        let message = ChatMessage::user(text, as_millis(now));
        self.messages.push(message.clone());

        let branch = match &self.script.branch {
            Some(branch) if !self.scripted_played && branch.matches(input, page) => {
                Some(branch.clone())
            }
            _ => None,
        };

        if let Some(branch) = branch {
            self.scripted_played = true;
            debug!(trigger = %branch.trigger_phrase, "scripted chat branch started");
            let first_at = now + self.delays.thinking;
            self.schedule(first_at, branch.first, None);
            self.schedule(
                first_at + self.delays.followup,
                branch.second,
                Some(branch.notification),
            );
        } else {
            let reply = self.reply_for(text);
            self.schedule(now + self.delays.reply, reply, None);
        }

        Some(message)
    }

    fn schedule(&mut self, at: Duration, content: Vec<ContentBlock>, notify: Option<NotificationTemplate>) {
        let key = self.next_reply;
        self.next_reply += 1;
        self.pending.push((key, PendingReply { content, notify }));
        self.timers.schedule(key, at);
    }

    /// Deliver replies whose delay has elapsed
    pub fn tick(&mut self, now: Duration) -> Vec<ChatEvent> {
        let mut events = Vec::new();

        while let Some((at, key)) = self.timers.pop_due(now) {
            let Some(idx) = self.pending.iter().position(|(k, _)| *k == key) else {
                continue;
            };
            let (_, reply) = self.pending.remove(idx);

            let message = ChatMessage::assistant(reply.content, as_millis(at));
            self.messages.push(message.clone());
            events.push(ChatEvent::BotMessage(message));
            if let Some(template) = reply.notify {
                events.push(ChatEvent::RaiseNotification { template, at });
            }
        }

        events
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    /// Drop pending replies
    pub fn teardown(&mut self) {
        self.timers.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::rules::{ReplyRule, ScriptedBranch};
    use crate::models::{plain_text, ChatRole, NotificationKind};

    const TRIGGER: &str = "Saya belum punya ide";

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn script() -> ChatScript {
        ChatScript {
            rules: vec![
                ReplyRule::new("ringkasan", vec![ContentBlock::paragraph("Ini ringkasannya.")]),
                ReplyRule::new("cari", vec![ContentBlock::paragraph("Hasil pencarian.")]),
                ReplyRule::new("jelaskan", vec![ContentBlock::paragraph("Penjelasannya.")]),
            ],
            fallbacks: vec![
                vec![ContentBlock::paragraph("Fallback satu")],
                vec![ContentBlock::paragraph("Fallback dua")],
            ],
            branch: Some(ScriptedBranch {
                trigger_phrase: TRIGGER.into(),
                document_id: Some("doc-engagement".into()),
                first: vec![ContentBlock::paragraph("Bagian pertama")],
                second: vec![ContentBlock::paragraph("Bagian kedua")],
                notification: NotificationTemplate::new(
                    NotificationKind::Chat,
                    "Asisten",
                    "Ada saran baru",
                ),
            }),
        }
    }

    fn assistant() -> ChatAssistant {
        let delays = ChatDelays {
            thinking: ms(1_500),
            followup: ms(2_000),
            reply: ms(800),
        };
        ChatAssistant::with_seed(script(), delays, 7)
    }

    fn bot_texts(events: &[ChatEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                ChatEvent::BotMessage(m) => Some(plain_text(&m.content)),
                ChatEvent::RaiseNotification { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_trigger_phrase_plays_two_parts_once() {
        let mut chat = assistant();
        chat.submit(TRIGGER, None, ms(0)).unwrap();
        assert!(chat.is_thinking());
        assert!(chat.tick(ms(1_499)).is_empty());

        let first = chat.tick(ms(1_500));
        assert_eq!(bot_texts(&first), vec!["Bagian pertama"]);
        assert!(chat.is_thinking());

        let second = chat.tick(ms(3_500));
        assert_eq!(bot_texts(&second), vec!["Bagian kedua"]);
        assert!(matches!(
            second.last(),
            Some(ChatEvent::RaiseNotification { template, at })
                if template.kind == NotificationKind::Chat && *at == ms(3_500)
        ));
        assert!(!chat.is_thinking());
        assert!(chat.scripted_played());

        // Second time falls through to the fallback pool
        chat.submit(TRIGGER, None, ms(4_000));
        let events = chat.tick(ms(10_000));
        let texts = bot_texts(&events);
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("Fallback"));
        assert!(!events.iter().any(|e| matches!(e, ChatEvent::RaiseNotification { .. })));
    }

    #[test]
    fn test_designated_page_starts_branch() {
        let mut chat = assistant();
        chat.submit("halo", Some("doc-engagement"), ms(0));
        assert_eq!(
            bot_texts(&chat.tick(ms(10_000))),
            vec!["Bagian pertama", "Bagian kedua"]
        );
    }

    #[test]
    fn test_keyword_reply_after_delay() {
        let mut chat = assistant();
        chat.submit("Tolong buat RINGKASAN rapat", None, ms(100));
        assert!(chat.tick(ms(899)).is_empty());
        let events = chat.tick(ms(900));
        assert_eq!(bot_texts(&events), vec!["Ini ringkasannya."]);

        let roles: Vec<_> = chat.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant]);
        assert_eq!(chat.messages()[1].sent_at, 900);
    }

    #[test]
    fn test_fallback_is_from_pool() {
        let mut chat = assistant();
        for _ in 0..20 {
            let reply = plain_text(&chat.reply_for("apa kabar"));
            assert!(reply == "Fallback satu" || reply == "Fallback dua");
        }
    }

    #[test]
    fn test_empty_fallback_pool_has_default() {
        let mut chat = ChatAssistant::with_seed(ChatScript::default(), ChatDelays::default(), 1);
        assert_eq!(plain_text(&chat.reply_for("apa")), DEFAULT_FALLBACK);
    }

    #[test]
    fn test_blank_input_ignored() {
        let mut chat = assistant();
        assert!(chat.submit("   ", None, ms(0)).is_none());
        assert!(chat.messages().is_empty());
        assert!(!chat.is_thinking());
    }

    #[test]
    fn test_panel_state() {
        let mut chat = assistant();
        assert!(!chat.is_open());
        chat.minimize();
        assert!(!chat.is_minimized());

        chat.toggle();
        assert!(chat.is_open());
        chat.minimize();
        assert!(chat.is_minimized());
        chat.expand();
        assert!(!chat.is_minimized());

        chat.minimize();
        chat.close();
        chat.open();
        assert!(chat.is_open() && !chat.is_minimized());
        chat.toggle();
        assert!(!chat.is_open());
    }

    #[test]
    fn test_teardown_drops_pending_replies() {
        let mut chat = assistant();
        chat.submit(TRIGGER, None, ms(0));
        chat.teardown();
        assert!(!chat.is_thinking());
        assert!(chat.tick(ms(60_000)).is_empty());
    }
}
