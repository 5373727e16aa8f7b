// Demo walkthrough notifications. This path does not use the rotating pool:
// the host decides the step up front (from persisted demo flags) and exactly
// one notification of the two-element sequence is raised.

use serde::{Deserialize, Serialize};

use crate::models::NotificationTemplate;

/// How the sequencer picks notifications. Passed in at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum SequencerMode {
    /// Rotating pool injected on a timer, plus route triggers
    #[default]
    Normal,
    /// Single scripted notification chosen by `step`
    Demo {
        #[serde(rename = "demoStep")]
        step: usize,
    },
}

/// The notification a demo session shows, or None when the step is past the
/// end of the sequence
pub fn select_demo_notification(
    sequence: &[NotificationTemplate],
    step: usize,
) -> Option<&NotificationTemplate> {
    sequence.get(step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationKind;

    #[test]
    fn test_step_selects_sequence_entry() {
        let sequence = vec![
            NotificationTemplate::new(NotificationKind::Email, "first", ""),
            NotificationTemplate::new(NotificationKind::Chat, "second", ""),
        ];
        assert_eq!(select_demo_notification(&sequence, 0).unwrap().title, "first");
        assert_eq!(select_demo_notification(&sequence, 1).unwrap().title, "second");
        assert!(select_demo_notification(&sequence, 2).is_none());
    }

    #[test]
    fn test_mode_serialized_shape() {
        let json = serde_json::to_value(SequencerMode::Demo { step: 1 }).unwrap();
        assert_eq!(json["mode"], "demo");
        assert_eq!(json["demoStep"], 1);
        assert_eq!(SequencerMode::default(), SequencerMode::Normal);
    }
}
