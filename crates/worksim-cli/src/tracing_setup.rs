use std::fs::OpenOptions;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_ENV: &str = "WORKSIM_LOG";
const LOG_FILE_ENV: &str = "WORKSIM_LOG_FILE";

/// Install the global subscriber. Logs go to stderr, or to the file named
/// by `WORKSIM_LOG_FILE` so they don't interleave with the REPL.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry();

    if let Ok(log_path) = std::env::var(LOG_FILE_ENV) {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file {log_path}"))?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_filter(filter);

        registry.with(file_layer).init();
        eprintln!("File logging enabled: {}", log_path);
    } else {
        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter);
        registry.with(stderr_layer).init();
    }

    Ok(())
}
