use crate::conference::PlayerEvent;
use crate::models::{ChatMessage, Notification};

/// Everything a host renders as the simulation advances
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimEvent {
    Conference(PlayerEvent),
    NotificationRaised(Notification),
    /// The popup auto-hid without being acted on
    PopupHidden,
    ChatReply(ChatMessage),
}
