pub mod project;

pub use project::Config;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

pub const CONFIG_FILE: &str = "regex-styler.toml";

/// Engine tuning knobs, persisted as TOML next to the settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigData {
    pub version: String,
    pub timing: TimingConfig,
    pub markers: MarkerConfig,
    pub badge: BadgeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Quiet period after the last mutation before a scan runs.
    pub debounce_ms: u64,
    /// Periodic rescan while target elements exist.
    pub rescan_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub styled_class: String,
    pub original_style_attr: String,
    pub config_id_attr: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BadgeConfig {
    pub class: String,
    pub default_color: String,
}

impl TimingConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn rescan_interval(&self) -> Duration {
        Duration::from_millis(self.rescan_interval_ms)
    }

    /// Both timers must be positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("timing.debounce_ms", self.debounce_ms),
            ("timing.rescan_interval_ms", self.rescan_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for ConfigData {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            timing: TimingConfig::default(),
            markers: MarkerConfig::default(),
            badge: BadgeConfig::default(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            rescan_interval_ms: 10_000,
        }
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            styled_class: "regex-styled-title".to_string(),
            original_style_attr: "data-original-style".to_string(),
            config_id_attr: "data-config-id".to_string(),
        }
    }
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            class: "date-badge".to_string(),
            default_color: "#cccccc".to_string(),
        }
    }
}
