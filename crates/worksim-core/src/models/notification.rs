use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Email,
    Chat,
    Task,
}

impl NotificationKind {
    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Email => "✉",
            NotificationKind::Chat => "💬",
            NotificationKind::Task => "☑",
        }
    }
}

/// What raises a pool notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "on", rename_all = "camelCase")]
pub enum Trigger {
    /// Injected in pool order by the periodic timer
    Elapsed,
    /// Raised once, the first time a route starting with `prefix` is visited
    Route { prefix: String },
}

/// Static description of a notification before it is raised
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTemplate {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub trigger: Trigger,
}

impl NotificationTemplate {
    pub fn new(kind: NotificationKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
            link: None,
            trigger: Trigger::Elapsed,
        }
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn on_route(mut self, prefix: impl Into<String>) -> Self {
        self.trigger = Trigger::Route {
            prefix: prefix.into(),
        };
        self
    }

    /// Raise this template at simulation time `time_ms`
    pub fn raise(&self, time_ms: u64) -> Notification {
        Notification {
            id: Uuid::new_v4().to_string(),
            kind: self.kind,
            title: self.title.clone(),
            message: self.message.clone(),
            time: time_ms,
            link: self.link.clone(),
            read: false,
            viewed: false,
        }
    }
}

/// A raised notification. Never deleted; viewed ones drop out of the
/// active carousel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Simulation-clock offset in milliseconds
    pub time: u64,
    pub link: Option<String>,
    pub read: bool,
    pub viewed: bool,
}

impl Notification {
    pub fn is_active(&self) -> bool {
        !self.viewed
    }

    pub fn mark_viewed(&mut self) {
        self.read = true;
        self.viewed = true;
    }

    /// Relative label such as "baru saja" or "3 menit lalu"
    pub fn age_label(&self, now_ms: u64) -> String {
        let minutes = now_ms.saturating_sub(self.time) / 60_000;
        match minutes {
            0 => "baru saja".to_string(),
            m if m < 60 => format!("{} menit lalu", m),
            m => format!("{} jam lalu", m / 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_starts_unread_and_unviewed() {
        let template = NotificationTemplate::new(NotificationKind::Email, "Email baru", "Dari HR")
            .link("/participant/email/inbox");
        let n = template.raise(1_000);
        assert!(!n.read);
        assert!(!n.viewed);
        assert!(n.is_active());
        assert_eq!(n.time, 1_000);
        assert_eq!(n.link.as_deref(), Some("/participant/email/inbox"));
        assert_ne!(n.id, template.raise(1_000).id);
    }

    #[test]
    fn test_mark_viewed_sets_both_flags() {
        let mut n = NotificationTemplate::new(NotificationKind::Task, "Tugas", "Baca").raise(0);
        n.mark_viewed();
        assert!(n.read && n.viewed);
        assert!(!n.is_active());
    }

    #[test]
    fn test_age_label() {
        let n = NotificationTemplate::new(NotificationKind::Chat, "t", "m").raise(0);
        assert_eq!(n.age_label(59_000), "baru saja");
        assert_eq!(n.age_label(3 * 60_000), "3 menit lalu");
        assert_eq!(n.age_label(125 * 60_000), "2 jam lalu");
    }

    #[test]
    fn test_kind_serializes_as_type() {
        let n = NotificationTemplate::new(NotificationKind::Chat, "t", "m").raise(0);
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "chat");
    }
}
