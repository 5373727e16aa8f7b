use worksim_core::models::{ContentBlock, Document, DocumentPatch, DraftEmail};
use worksim_core::store::DraftStore;
use worksim_core::{SimEvent, SimulationRuntime};

use crate::format::{
    format_document_row, format_draft_row, format_notification, format_sent_row, print_error_raw,
    print_help_raw, print_system_raw, render_blocks, short_id,
};
use crate::{CYAN, DIM, GREEN, RESET, WHITE_BOLD};

pub(crate) enum CommandResult {
    Lines(Vec<String>),
    /// Events produced by the command, printed like ticker events
    Events(Vec<String>, Vec<SimEvent>),
    Quit,
}

/// Handle one line of input
pub(crate) fn handle_line(line: &str, runtime: &SimulationRuntime) -> CommandResult {
    let line = line.trim();
    if line.is_empty() {
        return CommandResult::Lines(Vec::new());
    }
    let Some(command) = line.strip_prefix('/') else {
        return handle_chat(line, runtime);
    };

    let (name, arg) = match command.split_once(' ') {
        Some((name, arg)) => (name, Some(arg.trim())),
        None => (command, None),
    };

    match name {
        "help" | "h" => CommandResult::Lines(vec![print_help_raw()]),
        "quit" | "q" | "exit" => CommandResult::Quit,
        "play" => {
            let events = runtime.with_session(|s, now| s.mount_conference(now));
            CommandResult::Events(vec![print_system_raw("Bergabung ke rapat...")], events)
        }
        "leave" => {
            runtime.with_session(|s, _| s.unmount_conference());
            CommandResult::Lines(vec![print_system_raw("Keluar dari rapat.")])
        }
        "transcript" => CommandResult::Lines(handle_transcript(runtime)),
        "go" => match arg {
            Some(route) if !route.is_empty() => {
                let events = runtime.with_session(|s, now| s.navigate(route, now));
                CommandResult::Events(vec![format!("{DIM}→ {route}{RESET}")], events)
            }
            _ => CommandResult::Lines(vec![print_error_raw("Usage: /go <route>")]),
        },
        "notif" | "n" => CommandResult::Lines(handle_notif_command(arg, runtime)),
        "panel" => CommandResult::Lines(handle_panel_command(arg, runtime)),
        "docs" => CommandResult::Lines(handle_docs(runtime)),
        "doc" => CommandResult::Lines(handle_doc_command(arg, runtime)),
        "drafts" => CommandResult::Lines(handle_drafts(runtime)),
        "draft" => CommandResult::Lines(handle_draft_command(arg, runtime)),
        "send" => CommandResult::Lines(handle_send_command(arg, runtime)),
        "sent" => CommandResult::Lines(handle_sent(runtime)),
        "flags" => CommandResult::Lines(handle_flags_command(arg, runtime)),
        other => CommandResult::Lines(vec![print_error_raw(&format!(
            "Unknown command: /{other} (try /help)"
        ))]),
    }
}

// ─── Chat ───────────────────────────────────────────────────────────────────

fn handle_chat(text: &str, runtime: &SimulationRuntime) -> CommandResult {
    match runtime.with_session(|s, now| s.submit_chat(text, now)) {
        Some(_) => CommandResult::Lines(vec![format!("{DIM}Asisten sedang mengetik...{RESET}")]),
        None => CommandResult::Lines(Vec::new()),
    }
}

fn handle_panel_command(arg: Option<&str>, runtime: &SimulationRuntime) -> Vec<String> {
    runtime.with_session(|s, _| {
        let chat = s.chat_mut();
        match arg.unwrap_or("toggle") {
            "open" => chat.open(),
            "close" => chat.close(),
            "toggle" => chat.toggle(),
            "min" | "minimize" => chat.minimize(),
            "expand" => chat.expand(),
            other => return vec![print_error_raw(&format!("Unknown panel action: {other}"))],
        }
        let state = match (chat.is_open(), chat.is_minimized()) {
            (false, _) => "closed",
            (true, true) => "minimized",
            (true, false) => "open",
        };
        vec![print_system_raw(&format!("Chat panel {state}"))]
    })
}

// ─── Conference ─────────────────────────────────────────────────────────────

fn handle_transcript(runtime: &SimulationRuntime) -> Vec<String> {
    runtime.with_session(|s, _| {
        let Some(player) = s.player() else {
            return vec![print_system_raw("Not in a meeting. Use /play.")];
        };
        let mut output = vec![format!("{WHITE_BOLD}Transkrip:{RESET}")];
        for entry in player.transcript() {
            output.push(format!("  {GREEN}{}:{RESET} {}", entry.speaker, entry.content));
        }
        if player.conversation_ended() {
            output.push(format!("{DIM}(selesai){RESET}"));
        } else if let Some(idx) = player.speaking_index() {
            let speaker = &player.roster()[idx];
            output.push(format!("{DIM}{} sedang berbicara...{RESET}", speaker.name));
        }
        output
    })
}

// ─── Notifications ──────────────────────────────────────────────────────────

fn handle_notif_command(arg: Option<&str>, runtime: &SimulationRuntime) -> Vec<String> {
    let (action, rest) = match arg.and_then(|a| a.split_once(' ')) {
        Some((action, rest)) => (action, Some(rest.trim())),
        None => (arg.unwrap_or("list"), None),
    };

    runtime.with_session(|s, now| {
        let now_ms = now.as_millis() as u64;
        match action {
            "list" | "" => {
                let seq = s.notifications();
                if seq.notifications().is_empty() {
                    return vec![print_system_raw("Belum ada notifikasi.")];
                }
                let current_id = seq.current().map(|n| n.id.clone());
                let mut output = vec![format!(
                    "{WHITE_BOLD}Notifikasi{RESET} {DIM}({} belum dibaca, {} aktif){RESET}",
                    seq.unread_count(),
                    seq.active_count()
                )];
                for n in seq.notifications() {
                    let current = current_id.as_deref() == Some(n.id.as_str());
                    output.push(format_notification(n, now_ms, current));
                }
                output
            }
            "view" => match s.view_notification(now) {
                Some(n) => {
                    let mut output = vec![format!("{WHITE_BOLD}{}{RESET}", n.title), n.message.clone()];
                    if let Some(link) = n.link {
                        output.push(format!("{DIM}Buka: /go {link}{RESET}"));
                    }
                    output
                }
                None => vec![print_system_raw("Tidak ada notifikasi aktif.")],
            },
            "read" => {
                let Some(prefix) = rest.filter(|r| !r.is_empty()) else {
                    return vec![print_error_raw("Usage: /notif read <id>")];
                };
                let id = s
                    .notifications()
                    .notifications()
                    .iter()
                    .find(|n| n.id == prefix || short_id(&n.id) == prefix)
                    .map(|n| n.id.clone());
                match id.and_then(|id| s.mark_notification_read(&id, now)) {
                    Some(n) => vec![print_system_raw(&format!("Dibaca: {}", n.title))],
                    None => vec![print_error_raw(&format!("No active notification {prefix}"))],
                }
            }
            "dismiss" => {
                s.notifications_mut().dismiss();
                Vec::new()
            }
            "next" | "prev" => {
                let seq = s.notifications_mut();
                let moved = if action == "next" { seq.next() } else { seq.previous() };
                match seq.current() {
                    Some(n) if moved => vec![format_notification(n, now_ms, true)],
                    _ => vec![print_system_raw("Tidak ada notifikasi lain.")],
                }
            }
            "show" => {
                let seq = s.notifications_mut();
                if seq.show(now) {
                    seq.current()
                        .map(|n| vec![format_notification(n, now_ms, true)])
                        .unwrap_or_default()
                } else {
                    vec![print_system_raw("Tidak ada notifikasi aktif.")]
                }
            }
            "clear" => {
                s.notifications_mut().clear_all();
                vec![print_system_raw("Semua notifikasi ditandai dibaca.")]
            }
            other => vec![print_error_raw(&format!("Unknown notif action: {other}"))],
        }
    })
}

// ─── Documents ──────────────────────────────────────────────────────────────

fn handle_docs(runtime: &SimulationRuntime) -> Vec<String> {
    runtime.with_session(|s, _| {
        let mut output = vec![format!("{WHITE_BOLD}Dokumen:{RESET}")];
        output.extend(s.list_documents().iter().map(format_document_row));
        output
    })
}

fn handle_doc_command(arg: Option<&str>, runtime: &SimulationRuntime) -> Vec<String> {
    let Some(arg) = arg.filter(|a| !a.is_empty()) else {
        return vec![print_error_raw("Usage: /doc <id> | new | edit | rm")];
    };
    let (action, rest) = arg.split_once(' ').unwrap_or((arg, ""));
    let rest = rest.trim();

    runtime.with_session(|s, _| match action {
        "new" => {
            let (title, text) = rest.split_once('|').unwrap_or(("", rest));
            let content = paragraphs(text);
            match s.documents_mut().save(Document::new(title.trim(), content)) {
                Ok(id) => vec![print_system_raw(&format!("Dokumen disimpan: {id}"))],
                Err(e) => vec![print_error_raw(&e.to_string())],
            }
        }
        "edit" => {
            let (id, text) = rest.split_once(' ').unwrap_or((rest, ""));
            let patch = DocumentPatch {
                content: Some(paragraphs(text)),
                ..Default::default()
            };
            match s.documents_mut().update(id, patch) {
                Ok(Some(doc)) => vec![print_system_raw(&format!("Diperbarui: {}", doc.title))],
                Ok(None) => vec![print_error_raw(&format!("Dokumen tidak ditemukan: {id}"))],
                Err(e) => vec![print_error_raw(&e.to_string())],
            }
        }
        "rm" => match s.documents_mut().delete(rest) {
            Ok(true) => vec![print_system_raw("Dokumen dihapus.")],
            Ok(false) => vec![print_error_raw(&format!("Dokumen tidak ditemukan: {rest}"))],
            Err(e) => vec![print_error_raw(&e.to_string())],
        },
        id => match s.open_document(id) {
            Some(doc) => {
                let mut output = vec![format!("{CYAN}{}{RESET}", doc.id)];
                output.extend(render_blocks(&doc.content));
                output
            }
            None => vec![
                print_error_raw(&format!("Dokumen tidak ditemukan: {id}")),
                format!("{DIM}Lihat /docs untuk daftar dokumen.{RESET}"),
            ],
        },
    })
}

fn paragraphs(text: &str) -> Vec<ContentBlock> {
    text.split("\\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ContentBlock::paragraph)
        .collect()
}

// ─── Email ──────────────────────────────────────────────────────────────────

fn handle_drafts(runtime: &SimulationRuntime) -> Vec<String> {
    runtime.with_session(|s, _| {
        let drafts = s.drafts().list();
        if drafts.is_empty() {
            return vec![print_system_raw("Belum ada draf.")];
        }
        let mut output = vec![format!("{WHITE_BOLD}Draf:{RESET}")];
        output.extend(drafts.iter().map(format_draft_row));
        output
    })
}

fn handle_draft_command(arg: Option<&str>, runtime: &SimulationRuntime) -> Vec<String> {
    let arg = arg.unwrap_or("");
    let (action, rest) = arg.split_once(' ').unwrap_or((arg, ""));

    runtime.with_session(|s, _| match action {
        "new" => {
            let mut parts = rest.splitn(3, '|').map(str::trim);
            let recipients: Vec<String> = parts
                .next()
                .unwrap_or("")
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .collect();
            let subject = parts.next().unwrap_or("");
            let body = paragraphs(parts.next().unwrap_or(""));
            let draft = DraftEmail::new(subject, recipients, body);
            if draft.is_empty() {
                return vec![print_error_raw("Draf kosong tidak disimpan.")];
            }
            match s.drafts_mut().save(draft) {
                Ok(id) => vec![print_system_raw(&format!("Draf disimpan: {id}"))],
                Err(e) => vec![print_error_raw(&e.to_string())],
            }
        }
        "rm" => match s.drafts_mut().delete(rest.trim()) {
            Ok(true) => vec![print_system_raw("Draf dihapus.")],
            Ok(false) => vec![print_error_raw(&format!("Draf tidak ditemukan: {rest}"))],
            Err(e) => vec![print_error_raw(&e.to_string())],
        },
        _ => vec![print_error_raw("Usage: /draft new <to,..> | <subject> | <body> | /draft rm <id>")],
    })
}

fn handle_send_command(arg: Option<&str>, runtime: &SimulationRuntime) -> Vec<String> {
    let Some(id) = arg.filter(|a| !a.is_empty()) else {
        return vec![print_error_raw("Usage: /send <draft-id>")];
    };
    runtime.with_session(|s, _| match s.send_draft(id) {
        Ok(Some(email)) => vec![print_system_raw(&format!("Terkirim: {}", email.subject))],
        Ok(None) => vec![print_error_raw(&format!("Draf tidak ditemukan: {id}"))],
        Err(e) if !e.fields().is_empty() => e
            .fields()
            .iter()
            .map(|f| print_error_raw(&format!("{}: {}", f.field, f.message)))
            .collect(),
        Err(e) => vec![print_error_raw(&e.to_string())],
    })
}

fn handle_sent(runtime: &SimulationRuntime) -> Vec<String> {
    runtime.with_session(|s, _| {
        let sent = s.sent().list();
        if sent.is_empty() {
            return vec![print_system_raw("Belum ada email terkirim.")];
        }
        let mut output = vec![format!("{WHITE_BOLD}Terkirim:{RESET}")];
        output.extend(sent.iter().map(format_sent_row));
        output
    })
}

// ─── Demo flags ─────────────────────────────────────────────────────────────

fn handle_flags_command(arg: Option<&str>, runtime: &SimulationRuntime) -> Vec<String> {
    runtime.with_session(|s, _| {
        let store = s.demo_flags_mut();
        match arg {
            None | Some("") => {}
            Some("demo on") => store.set_use_multiple_options_flow(true),
            Some("demo off") => store.set_use_multiple_options_flow(false),
            Some("reset") => store.reset(),
            Some(other) => return vec![print_error_raw(&format!("Unknown flags action: {other}"))],
        }
        let flags = store.flags();
        let mut output = vec![
            format!("{WHITE_BOLD}Demo flags:{RESET}"),
            format!("  useMultipleOptionsFlow  {}", flags.use_multiple_options_flow),
            format!("  continueEngagementChat  {}", flags.continue_engagement_chat),
            format!("  showNoIdeaHistory       {}", flags.show_no_idea_history),
        ];
        if arg.is_some_and(|a| !a.is_empty()) {
            output.push(format!("{DIM}Takes effect in the next session.{RESET}"));
        }
        output
    })
}
