//! Runtime settings
//!
//! Read once at startup from `<config_dir>/kanapad/config.toml`, or from the
//! file named by `KANAPAD_CONFIG`. Every field is optional in the file; a
//! missing file means all defaults.

use crate::controller::classifier::DEFAULT_DEADZONE;
use crate::engine::{
    RepeatTiming, DEFAULT_LONG_PRESS_DELAY_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REPEAT_INTERVAL_MS,
};
use color_eyre::{eyre::eyre, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const CONFIG_ENV: &str = "KANAPAD_CONFIG";
const CONFIG_DIR: &str = "kanapad";
const CONFIG_FILE: &str = "config.toml";

/// Where keystrokes go
#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Linux virtual keyboard
    #[default]
    Uinput,
    /// Log only, nothing is typed
    Log,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Uinput => write!(f, "uinput"),
            OutputKind::Log => write!(f, "log"),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub poll_interval_ms: u64,
    /// Per-axis magnitude treated as zero, in `[0, 1)`
    pub deadzone: f32,
    pub long_press_delay_ms: u64,
    pub repeat_interval_ms: u64,
    pub output: OutputKind,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            deadzone: DEFAULT_DEADZONE,
            long_press_delay_ms: DEFAULT_LONG_PRESS_DELAY_MS,
            repeat_interval_ms: DEFAULT_REPEAT_INTERVAL_MS,
            output: OutputKind::default(),
        }
    }
}

impl Settings {
    /// Loads from `KANAPAD_CONFIG` if set, the user config directory otherwise
    pub async fn load() -> Result<Self> {
        match default_path() {
            Some(path) => Self::load_from(&path).await,
            None => {
                warn!("No config directory available, using default settings");
                Ok(Self::default())
            }
        }
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        if !tokio::fs::try_exists(path)
            .await
            .map_err(|e| eyre!("Failed to check if config file exists: {}", e))?
        {
            warn!(
                "Config file {} does not exist, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;
        let settings = Self::parse(&content)
            .map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))?;

        info!("Loaded settings from {}", path.display());
        debug!("{:?}", settings);
        Ok(settings)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(content).map_err(|e| eyre!("Failed to parse settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(eyre!("poll_interval_ms must be greater than zero"));
        }
        if self.repeat_interval_ms == 0 {
            return Err(eyre!("repeat_interval_ms must be greater than zero"));
        }
        if !(0.0..1.0).contains(&self.deadzone) {
            return Err(eyre!("deadzone must be in [0, 1), got {}", self.deadzone));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn repeat_timing(&self) -> RepeatTiming {
        RepeatTiming {
            initial_delay: Duration::from_millis(self.long_press_delay_ms),
            interval: Duration::from_millis(self.repeat_interval_ms),
        }
    }
}

fn default_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    let mut path = dirs::config_dir()?;
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    Some(path)
}
