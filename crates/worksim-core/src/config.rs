use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{timing, CONFIG_FILE, DATA_DIR_ENV, DEFAULT_DATA_DIR};
use crate::error::ConfigError;

/// Timer settings for every simulated component. Missing fields in
/// `config.json` fall back to the defaults in [`crate::constants::timing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationTiming {
    pub typing_interval_ms: u64,
    pub line_pause_ms: u64,
    pub popup_auto_hide_ms: u64,
    pub first_notification_delay_ms: u64,
    pub injection_interval_ms: u64,
    pub chat_thinking_ms: u64,
    pub chat_followup_ms: u64,
    pub chat_reply_ms: u64,
    pub tick_ms: u64,
}

impl Default for SimulationTiming {
    fn default() -> Self {
        Self {
            typing_interval_ms: timing::TYPING_INTERVAL_MS,
            line_pause_ms: timing::LINE_PAUSE_MS,
            popup_auto_hide_ms: timing::POPUP_AUTO_HIDE_MS,
            first_notification_delay_ms: timing::FIRST_NOTIFICATION_DELAY_MS,
            injection_interval_ms: timing::INJECTION_INTERVAL_MS,
            chat_thinking_ms: timing::CHAT_THINKING_MS,
            chat_followup_ms: timing::CHAT_FOLLOWUP_MS,
            chat_reply_ms: timing::CHAT_REPLY_MS,
            tick_ms: timing::TICK_MS,
        }
    }
}

impl SimulationTiming {
    pub fn typing_interval(&self) -> Duration {
        // A zero interval would reveal a whole script in a single tick loop
        Duration::from_millis(self.typing_interval_ms.max(1))
    }

    pub fn line_pause(&self) -> Duration {
        Duration::from_millis(self.line_pause_ms)
    }

    pub fn popup_auto_hide(&self) -> Duration {
        Duration::from_millis(self.popup_auto_hide_ms)
    }

    pub fn first_notification_delay(&self) -> Duration {
        Duration::from_millis(self.first_notification_delay_ms)
    }

    pub fn injection_interval(&self) -> Duration {
        Duration::from_millis(self.injection_interval_ms.max(1))
    }

    pub fn chat_thinking(&self) -> Duration {
        Duration::from_millis(self.chat_thinking_ms)
    }

    pub fn chat_followup(&self) -> Duration {
        Duration::from_millis(self.chat_followup_ms)
    }

    pub fn chat_reply(&self) -> Duration {
        Duration::from_millis(self.chat_reply_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub timing: SimulationTiming,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            timing: SimulationTiming::default(),
        }
    }

    /// Create the data directory if needed and read `config.json` from it.
    /// A missing config file is not an error.
    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Self, ConfigError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).map_err(|source| ConfigError::DataDir {
            path: data_dir.clone(),
            source,
        })?;

        let path = data_dir.join(CONFIG_FILE);
        let timing = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)
                .map_err(|source| ConfigError::Parse { path: path.clone(), source })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SimulationTiming::default(),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        tracing::debug!(data_dir = %data_dir.display(), ?timing, "loaded config");
        Ok(Self { data_dir, timing })
    }

    /// Resolve the data directory: explicit argument, then `WORKSIM_DATA_DIR`,
    /// then the platform data directory.
    pub fn resolve_data_dir(explicit: Option<PathBuf>) -> PathBuf {
        if let Some(dir) = explicit {
            return dir;
        }
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }
        dirs::data_dir()
            .map(|dir| dir.join("worksim"))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_without_config_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = CoreConfig::load(dir.path().join("nested")).unwrap();
        assert_eq!(config.timing, SimulationTiming::default());
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{ "typingIntervalMs": 30, "linePauseMs": 250 }"#,
        )
        .unwrap();

        let config = CoreConfig::load(dir.path()).unwrap();
        assert_eq!(config.timing.typing_interval(), Duration::from_millis(30));
        assert_eq!(config.timing.line_pause(), Duration::from_millis(250));
        assert_eq!(
            config.timing.popup_auto_hide_ms,
            timing::POPUP_AUTO_HIDE_MS
        );
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        assert!(matches!(
            CoreConfig::load(dir.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_explicit_data_dir_wins() {
        let dir = CoreConfig::resolve_data_dir(Some(PathBuf::from("/tmp/explicit")));
        assert_eq!(dir, PathBuf::from("/tmp/explicit"));
    }
}
