use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Context, Result, anyhow};
use vitrina_core::ReplyTiming;

const MIN_TICK_MS: u64 = 10;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Delay before the bot's first reply to a message
    pub reply_delay_ms: u64,
    /// Extra delay before the "other products" suggestion
    pub suggestion_delay_ms: u64,
    /// How often the UI polls for due replies and redraws
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            reply_delay_ms: 500,
            suggestion_delay_ms: 600,
            tick_rate_ms: 100,
        }
    }

    /// Load from `explicit` if given, otherwise from the user config dir.
    /// A missing file yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = Self::resolve_path(explicit)?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::info!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("Invalid config file: {}", config_path.display()))?;

        tracing::info!(path = %config_path.display(), "loaded config");
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;
        Ok(())
    }

    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("vitrina").join("config.json"))
    }

    pub fn reply_timing(&self) -> ReplyTiming {
        ReplyTiming {
            reply_delay: Duration::from_millis(self.reply_delay_ms),
            suggestion_delay: Duration::from_millis(self.suggestion_delay_ms),
        }
    }

    /// Tick interval, never zero
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(MIN_TICK_MS))
    }
}
