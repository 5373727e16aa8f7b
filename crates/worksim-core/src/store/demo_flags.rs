use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::DEMO_FLAGS_FILE;
use crate::notifications::SequencerMode;

/// Walkthrough flags persisted between sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DemoFlags {
    /// The participant opened the referenced engagement document
    pub continue_engagement_chat: bool,
    /// The participant saw the follow-up demo notification
    pub show_no_idea_history: bool,
    /// The session runs the guided walkthrough instead of the rotating pool
    pub use_multiple_options_flow: bool,
}

impl DemoFlags {
    /// Sequencer configuration for a new session
    pub fn sequencer_mode(&self) -> SequencerMode {
        if !self.use_multiple_options_flow {
            return SequencerMode::Normal;
        }
        let step = if self.continue_engagement_chat { 1 } else { 0 };
        SequencerMode::Demo { step }
    }
}

/// Demo flags backed by `demo_flags.json`, or held in memory only
pub struct DemoFlagStore {
    path: Option<PathBuf>,
    flags: DemoFlags,
}

impl DemoFlagStore {
    pub fn open(data_dir: &Path) -> Self {
        let path = data_dir.join(DEMO_FLAGS_FILE);
        let flags = Self::load_from_file(&path).unwrap_or_default();
        Self {
            path: Some(path),
            flags,
        }
    }

    pub fn in_memory(flags: DemoFlags) -> Self {
        Self { path: None, flags }
    }

    fn load_from_file(path: &Path) -> Option<DemoFlags> {
        let contents = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(flags) => Some(flags),
            Err(e) => {
                warn!(path = %path.display(), "ignoring invalid demo flags: {}", e);
                None
            }
        }
    }

    fn save_to_file(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let result = serde_json::to_string_pretty(&self.flags)
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(path, json).map_err(|e| e.to_string()));
        if let Err(e) = result {
            warn!(path = %path.display(), "failed to save demo flags: {}", e);
        }
    }

    pub fn flags(&self) -> DemoFlags {
        self.flags
    }

    pub fn sequencer_mode(&self) -> SequencerMode {
        self.flags.sequencer_mode()
    }

    pub fn set_use_multiple_options_flow(&mut self, value: bool) {
        self.flags.use_multiple_options_flow = value;
        self.save_to_file();
    }

    pub fn set_continue_engagement_chat(&mut self, value: bool) {
        self.flags.continue_engagement_chat = value;
        self.save_to_file();
    }

    pub fn set_show_no_idea_history(&mut self, value: bool) {
        self.flags.show_no_idea_history = value;
        self.save_to_file();
    }

    /// Opening the reference document moves the walkthrough to its second step.
    /// Returns true when the flag changed.
    pub fn record_document_view(&mut self, doc_id: &str, reference_id: &str) -> bool {
        if doc_id != reference_id || self.flags.continue_engagement_chat {
            return false;
        }
        self.set_continue_engagement_chat(true);
        true
    }

    /// Reset every flag to false
    pub fn reset(&mut self) {
        self.flags = DemoFlags::default();
        self.save_to_file();
    }
}
