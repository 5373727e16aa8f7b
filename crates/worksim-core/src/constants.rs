//! Application-wide constants
//!
//! Centralized location for storage keys and timing defaults that are used
//! across multiple modules.

// Storage keys (one JSON file per key in the data directory)
pub const DOCUMENTS_KEY: &str = "documents";
pub const DRAFTS_KEY: &str = "drafts";
pub const SENT_EMAILS_KEY: &str = "sent_emails";
pub const DEMO_FLAGS_FILE: &str = "demo_flags.json";
pub const CONFIG_FILE: &str = "config.json";

/// Data directory used when neither `--data-dir` nor `WORKSIM_DATA_DIR` is set
/// and the platform has no data dir.
pub const DEFAULT_DATA_DIR: &str = "worksim_data";

pub const DATA_DIR_ENV: &str = "WORKSIM_DATA_DIR";

// Id prefixes for stored records
pub const DOCUMENT_ID_PREFIX: &str = "doc";
pub const DRAFT_ID_PREFIX: &str = "draft";
pub const SENT_ID_PREFIX: &str = "sent";

pub const UNTITLED: &str = "Tanpa judul";

// Timing defaults (milliseconds)
pub mod timing {
    /// Per-character reveal interval of the conference typewriter
    pub const TYPING_INTERVAL_MS: u64 = 15;
    /// Pause between two script lines
    pub const LINE_PAUSE_MS: u64 = 1_000;
    /// Unacted notification popups hide after this long
    pub const POPUP_AUTO_HIDE_MS: u64 = 5_000;
    /// Delay before the first notification of a session
    pub const FIRST_NOTIFICATION_DELAY_MS: u64 = 3_000;
    /// Period between injected pool notifications
    pub const INJECTION_INTERVAL_MS: u64 = 30_000;
    /// "Thinking" delay before the first part of the scripted chat branch
    pub const CHAT_THINKING_MS: u64 = 1_500;
    /// Delay between the two parts of the scripted chat branch
    pub const CHAT_FOLLOWUP_MS: u64 = 2_000;
    /// Delay before keyword or fallback replies
    pub const CHAT_REPLY_MS: u64 = 800;
    /// Runtime driver tick period
    pub const TICK_MS: u64 = 15;
}
