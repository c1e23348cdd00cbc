//! Persistent user settings.
//!
//! Stored as JSON at `~/.taskreaper/config.json`. A missing file means
//! defaults; a missing key means that key's default.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::application::TerminationOptions;
use crate::domain::ActionKind;
use crate::error::{Error, Result};

/// Default label shown in front of catalog items.
pub const DEFAULT_ITEM_LABEL: &str = "Kill:";

/// User settings consumed read-only by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Action run when the user executes an entry without choosing one.
    #[serde(default)]
    pub default_action: ActionKind,

    /// Leave processes without a switchable window out of the catalog.
    #[serde(default)]
    pub hide_background: bool,

    /// Display label for catalog items. No effect on behaviour.
    #[serde(default = "default_item_label")]
    pub item_label: String,

    /// Ask applications to close before force-killing them.
    #[serde(default = "default_true")]
    pub graceful_close: bool,

    /// Wait after the close request, in milliseconds.
    #[serde(default = "default_graceful_timeout_ms")]
    pub graceful_timeout_ms: u64,

    /// Wait confirming exit before a restart, in milliseconds.
    #[serde(default = "default_restart_wait_timeout_ms")]
    pub restart_wait_timeout_ms: u64,
}

fn default_item_label() -> String {
    DEFAULT_ITEM_LABEL.to_string()
}

fn default_true() -> bool {
    true
}

fn default_graceful_timeout_ms() -> u64 {
    crate::application::DEFAULT_GRACEFUL_TIMEOUT_MS
}

fn default_restart_wait_timeout_ms() -> u64 {
    crate::application::DEFAULT_RESTART_WAIT_TIMEOUT_MS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_action: ActionKind::default(),
            hide_background: false,
            item_label: default_item_label(),
            graceful_close: true,
            graceful_timeout_ms: default_graceful_timeout_ms(),
            restart_wait_timeout_ms: default_restart_wait_timeout_ms(),
        }
    }
}

impl Settings {
    /// Termination engine options derived from these settings.
    pub fn termination_options(&self) -> TerminationOptions {
        TerminationOptions {
            graceful_close: self.graceful_close,
            graceful_timeout: Duration::from_millis(self.graceful_timeout_ms),
            restart_wait_timeout: Duration::from_millis(self.restart_wait_timeout_ms),
        }
    }
}

/// Loads and saves [`Settings`].
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Store at the default path, `~/.taskreaper/config.json`.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        Ok(Self {
            config_path: home.join(".taskreaper").join("config.json"),
        })
    }

    /// Store at a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load settings; defaults when the file does not exist.
    pub async fn load(&self) -> Result<Settings> {
        if !self.config_path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save settings, creating the directory if needed.
    ///
    /// Writes a temp file and renames it over the old one.
    pub async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(dir) = self.config_path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(settings)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        let temp_path = self.config_path.with_extension("json.tmp");
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;
        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }

    /// Load, modify and save in one step.
    pub async fn update(&self, change: impl FnOnce(&mut Settings)) -> Result<Settings> {
        let mut settings = self.load().await?;
        change(&mut settings);
        self.save(&settings).await?;
        Ok(settings)
    }

    pub async fn set_default_action(&self, action: ActionKind) -> Result<Settings> {
        self.update(|s| s.default_action = action).await
    }

    pub async fn set_hide_background(&self, hide: bool) -> Result<Settings> {
        self.update(|s| s.hide_background = hide).await
    }
}
