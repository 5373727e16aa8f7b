use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use worksim_core::store::{DemoFlagStore, DemoFlags};
use worksim_core::{Catalog, CoreConfig, ParticipantSession, SessionStores, SimEvent, SimulationRuntime};

// ANSI color codes
pub(crate) const CYAN: &str = "\x1b[36m";
pub(crate) const GREEN: &str = "\x1b[32m";
pub(crate) const ACCENT: &str = "\x1b[38;2;255;193;7m";
pub(crate) const YELLOW: &str = "\x1b[33m";
pub(crate) const RED: &str = "\x1b[31m";
pub(crate) const WHITE_BOLD: &str = "\x1b[1;37m";
pub(crate) const DIM: &str = "\x1b[2m";
pub(crate) const RESET: &str = "\x1b[0m";

mod commands;
mod format;
mod tracing_setup;

use commands::CommandResult;
use format::{format_event, print_system_raw, Rendered};

#[derive(Parser, Debug)]
#[command(name = "worksim")]
#[command(about = "Participant workplace simulation in the terminal")]
struct Args {
    /// Data directory (defaults to WORKSIM_DATA_DIR, then the platform data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep documents, drafts and demo flags in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Seed for the assistant's fallback replies
    #[arg(long)]
    seed: Option<u64>,
}

fn print_lines(lines: &[String]) {
    let mut out = std::io::stdout();
    for line in lines {
        writeln!(out, "{line}").ok();
    }
    out.flush().ok();
}

fn print_event(event: &SimEvent, names: &HashMap<String, String>) {
    let speaker_of = |id: &str| names.get(id).cloned().unwrap_or_else(|| id.to_string());
    match format_event(event, speaker_of) {
        Rendered::Inline(text) => {
            let mut out = std::io::stdout();
            write!(out, "{text}").ok();
            out.flush().ok();
        }
        Rendered::Lines(lines) => print_lines(&lines),
        Rendered::Nothing => {}
    }
}

fn build_session(args: &Args, config: &CoreConfig) -> ParticipantSession {
    let stores = if args.ephemeral {
        SessionStores::in_memory(DemoFlagStore::in_memory(DemoFlags::default()))
    } else {
        SessionStores::open(&config.data_dir)
    };
    let catalog = Catalog::builtin();
    match args.seed {
        Some(seed) => ParticipantSession::with_seed(catalog, config.timing.clone(), stores, seed),
        None => ParticipantSession::new(catalog, config.timing.clone(), stores),
    }
}

async fn run_repl(
    runtime: &SimulationRuntime,
    mut events: UnboundedReceiver<SimEvent>,
    names: &HashMap<String, String>,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match commands::handle_line(&line, runtime) {
                    CommandResult::Lines(output) => print_lines(&output),
                    CommandResult::Events(output, produced) => {
                        print_lines(&output);
                        runtime.dispatch(produced);
                    }
                    CommandResult::Quit => break,
                }
            }
            Some(event) = events.recv() => print_event(&event, names),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_setup::init_tracing()?;

    let data_dir = CoreConfig::resolve_data_dir(args.data_dir.clone());
    let config = CoreConfig::load(&data_dir)
        .with_context(|| format!("Failed to load config from {}", data_dir.display()))?;

    tracing::info!(data_dir = %config.data_dir.display(), ephemeral = args.ephemeral, "starting worksim");
    let session = build_session(&args, &config);
    let names: HashMap<String, String> = session
        .catalog()
        .roster
        .iter()
        .map(|p| (p.id.clone(), p.name.clone()))
        .collect();

    let (mut runtime, events) = SimulationRuntime::spawn(session, config.timing.tick());
    runtime.with_session(|s, now| s.start(now));

    print_lines(&[
        format!("{WHITE_BOLD}worksim{RESET} {DIM}{}{RESET}", config.data_dir.display()),
        print_system_raw("Ketik /help untuk daftar perintah, /play untuk bergabung ke rapat."),
    ]);

    let result = run_repl(&runtime, events, &names).await;
    runtime.shutdown();
    result
}
