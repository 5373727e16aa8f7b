use worksim_core::conference::PlayerEvent;
use worksim_core::models::{ChatMessage, ChatRole, ContentBlock, Document, DraftEmail, Notification, SentEmail};
use worksim_core::SimEvent;

use crate::{ACCENT, CYAN, DIM, GREEN, RED, RESET, WHITE_BOLD, YELLOW};

pub(crate) fn print_error_raw(msg: &str) -> String {
    format!("{RED}error:{RESET} {msg}")
}

pub(crate) fn print_system_raw(msg: &str) -> String {
    format!("{YELLOW}{msg}{RESET}")
}

pub(crate) fn print_help_raw() -> String {
    format!(
        "{WHITE_BOLD}Commands:{RESET}\n\
         \x20 /play                 Join the meeting (restarts playback)\n\
         \x20 /leave                Leave the meeting\n\
         \x20 /transcript           Show the meeting transcript\n\
         \x20 /go <route>           Navigate, e.g. /go /participant/email\n\
         \x20 /notif [list]         Notifications with the current one marked\n\
         \x20 /notif view|dismiss|next|prev|clear|show\n\
         \x20 /notif read <id>      Mark one notification as read\n\
         \x20 /panel open|close|toggle|min|expand\n\
         \x20 /docs                 List documents\n\
         \x20 /doc <id>             Open a document\n\
         \x20 /doc new <title> | <text>\n\
         \x20 /doc edit <id> <text> Replace a document's text\n\
         \x20 /doc rm <id>          Delete a document\n\
         \x20 /drafts               List email drafts\n\
         \x20 /draft new <to,..> | <subject> | <body>\n\
         \x20 /draft rm <id>        Delete a draft\n\
         \x20 /send <draft-id>      Send a draft\n\
         \x20 /sent                 List sent email\n\
         \x20 /flags [demo on|off|reset]\n\
         \x20 /quit                 Exit\n\
         {DIM}Anything else is sent to the assistant.{RESET}"
    )
}

/// Render content blocks as terminal lines
pub(crate) fn render_blocks(blocks: &[ContentBlock]) -> Vec<String> {
    let mut lines = Vec::new();
    for block in blocks {
        match block {
            ContentBlock::Paragraph { text } => lines.push(text.clone()),
            ContentBlock::Heading { level, text } => {
                let marks = "#".repeat(usize::from(*level));
                lines.push(format!("{WHITE_BOLD}{marks} {text}{RESET}"));
            }
            ContentBlock::List { ordered, items } => {
                for (i, item) in items.iter().enumerate() {
                    if *ordered {
                        lines.push(format!("  {}. {item}", i + 1));
                    } else {
                        lines.push(format!("  • {item}"));
                    }
                }
            }
            ContentBlock::Table { headers, rows } => {
                let columns = headers.len().max(rows.iter().map(Vec::len).max().unwrap_or(0));
                let mut widths = vec![0usize; columns];
                for row in std::iter::once(headers).chain(rows.iter()) {
                    for (i, cell) in row.iter().enumerate() {
                        widths[i] = widths[i].max(cell.chars().count());
                    }
                }
                let render_row = |row: &[String]| {
                    row.iter()
                        .enumerate()
                        .map(|(i, cell)| format!("{cell:<width$}", width = widths[i]))
                        .collect::<Vec<_>>()
                        .join(" │ ")
                };
                lines.push(format!("{WHITE_BOLD}{}{RESET}", render_row(headers)));
                let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
                lines.push(format!("{DIM}{}{RESET}", rule.join("─┼─")));
                for row in rows {
                    lines.push(render_row(row));
                }
            }
        }
    }
    lines
}

pub(crate) fn format_notification(notification: &Notification, now_ms: u64, current: bool) -> String {
    let marker = if current {
        format!("{GREEN}*{RESET}")
    } else {
        " ".to_string()
    };
    let state = if notification.viewed {
        format!("{DIM}(viewed){RESET}")
    } else if notification.read {
        format!("{DIM}(read){RESET}")
    } else {
        String::new()
    };
    format!(
        "{marker} {} {WHITE_BOLD}{}{RESET} {} {DIM}· {} · {}{RESET} {state}",
        notification.kind.icon(),
        notification.title,
        notification.message,
        notification.age_label(now_ms),
        short_id(&notification.id),
    )
}

pub(crate) fn format_chat_message(message: &ChatMessage) -> Vec<String> {
    let label = match message.role {
        ChatRole::User => format!("{CYAN}Anda:{RESET}"),
        ChatRole::Assistant => format!("{ACCENT}Asisten:{RESET}"),
    };
    let mut lines = vec![label];
    lines.extend(render_blocks(&message.content).into_iter().map(|l| format!("  {l}")));
    lines
}

pub(crate) fn format_document_row(document: &Document) -> String {
    format!(
        "  {CYAN}{}{RESET} {WHITE_BOLD}{}{RESET} {DIM}{}{RESET}",
        document.id,
        document.title,
        document.preview()
    )
}

pub(crate) fn format_draft_row(draft: &DraftEmail) -> String {
    format!(
        "  {CYAN}{}{RESET} {WHITE_BOLD}{}{RESET} {DIM}→ {}{RESET}",
        draft.id,
        draft.subject,
        draft.recipients.join(", ")
    )
}

pub(crate) fn format_sent_row(email: &SentEmail) -> String {
    format!(
        "  {CYAN}{}{RESET} {WHITE_BOLD}{}{RESET} {DIM}→ {} · {}{RESET}",
        email.id,
        email.subject,
        email.recipients.join(", "),
        email.sent_at.with_timezone(&chrono::Local).format("%H:%M")
    )
}

/// Inline text for a simulation event. Typed characters are returned
/// without a newline so the transcript reveals in place.
pub(crate) enum Rendered {
    Inline(String),
    Lines(Vec<String>),
    Nothing,
}

pub(crate) fn format_event(event: &SimEvent, speaker_of: impl Fn(&str) -> String) -> Rendered {
    match event {
        SimEvent::Conference(PlayerEvent::LineStarted { speaker_id, .. }) => {
            Rendered::Inline(format!("{GREEN}{}:{RESET} ", speaker_of(speaker_id.as_str())))
        }
        SimEvent::Conference(PlayerEvent::CharRevealed { ch, .. }) => Rendered::Inline(ch.to_string()),
        SimEvent::Conference(PlayerEvent::EntryCommitted(_)) => Rendered::Inline("\n".to_string()),
        SimEvent::Conference(PlayerEvent::Ended) => {
            Rendered::Lines(vec![print_system_raw("Rapat selesai.")])
        }
        SimEvent::NotificationRaised(notification) => Rendered::Lines(vec![format!(
            "{ACCENT}🔔{RESET} {} {WHITE_BOLD}{}{RESET} {}",
            notification.kind.icon(),
            notification.title,
            notification.message
        )]),
        SimEvent::PopupHidden => Rendered::Nothing,
        SimEvent::ChatReply(message) => Rendered::Lines(format_chat_message(message)),
    }
}

/// First block of a uuid, enough to type back in `/notif read`
pub(crate) fn short_id(id: &str) -> &str {
    id.split('-').next().unwrap_or(id)
}
