use std::fs;
use std::path::{Path, PathBuf};

use super::{ConfigData, CONFIG_FILE};
use crate::error::{ConfigError, ErrorContext, StylerResult};

#[derive(Debug, Clone)]
pub struct Config {
    pub data: ConfigData,
    pub path: PathBuf,
}

impl Config {
    pub fn load_or_default(dir: impl AsRef<Path>) -> StylerResult<Self> {
        let config_path = dir.as_ref().join(CONFIG_FILE);

        let data: ConfigData = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            toml::from_str(&content)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?
        } else {
            ConfigData::default()
        };
        data.timing.validate()?;

        Ok(Self {
            data,
            path: config_path,
        })
    }

    pub fn init(dir: impl AsRef<Path>) -> StylerResult<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).context("Failed to create config directory")?;

        let config_path = dir.join(CONFIG_FILE);
        if !config_path.exists() {
            let content = toml::to_string_pretty(&ConfigData::default())
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            fs::write(&config_path, content).context("Failed to write initial config")?;
        }

        Ok(())
    }

    pub fn save(&self) -> StylerResult<()> {
        let content = toml::to_string_pretty(&self.data)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        fs::write(&self.path, content).context("Failed to write config file")?;

        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> StylerResult<()> {
        let invalid = || ConfigError::InvalidValue {
            field: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "timing.debounce_ms" | "timing.rescan_interval_ms" => {
                let millis: u64 = value.parse().map_err(|_| invalid())?;
                let mut timing = self.data.timing.clone();
                if key == "timing.debounce_ms" {
                    timing.debounce_ms = millis;
                } else {
                    timing.rescan_interval_ms = millis;
                }
                timing.validate()?;
                self.data.timing = timing;
            }
            "badge.default_color" => {
                self.data.badge.default_color = value.to_string();
            }
            "badge.class" => {
                self.data.badge.class = value.to_string();
            }
            "markers.styled_class" => {
                self.data.markers.styled_class = value.to_string();
            }
            _ => return Err(ConfigError::Invalid(format!("Unknown config key: {}", key)).into()),
        }

        self.save()?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> StylerResult<String> {
        let value = match key {
            "timing.debounce_ms" => self.data.timing.debounce_ms.to_string(),
            "timing.rescan_interval_ms" => self.data.timing.rescan_interval_ms.to_string(),
            "badge.default_color" => self.data.badge.default_color.clone(),
            "badge.class" => self.data.badge.class.clone(),
            "markers.styled_class" => self.data.markers.styled_class.clone(),
            _ => return Err(ConfigError::Invalid(format!("Unknown config key: {}", key)).into()),
        };

        Ok(value)
    }

    pub fn keys() -> &'static [&'static str] {
        &[
            "timing.debounce_ms",
            "timing.rescan_interval_ms",
            "badge.default_color",
            "badge.class",
            "markers.styled_class",
        ]
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: ConfigData::default(),
            path: PathBuf::from(CONFIG_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_missing() -> StylerResult<()> {
        let temp_dir = TempDir::new()?;
        let config = Config::load_or_default(temp_dir.path())?;

        assert_eq!(config.data.timing.debounce_ms, 1000);
        assert_eq!(config.data.timing.rescan_interval_ms, 10_000);
        assert_eq!(config.data.badge.default_color, "#cccccc");

        Ok(())
    }

    #[test]
    fn test_set_and_reload() -> StylerResult<()> {
        let temp_dir = TempDir::new()?;
        Config::init(temp_dir.path())?;

        let mut config = Config::load_or_default(temp_dir.path())?;
        config.set("timing.debounce_ms", "250")?;

        let reloaded = Config::load_or_default(temp_dir.path())?;
        assert_eq!(reloaded.get("timing.debounce_ms")?, "250");

        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> StylerResult<()> {
        let temp_dir = TempDir::new()?;
        fs::write(
            temp_dir.path().join(CONFIG_FILE),
            "[badge]\ndefault_color = \"#999999\"\n",
        )?;

        let config = Config::load_or_default(temp_dir.path())?;
        assert_eq!(config.data.badge.default_color, "#999999");
        assert_eq!(config.data.badge.class, "date-badge");
        assert_eq!(config.data.timing.rescan_interval_ms, 10_000);

        Ok(())
    }

    #[test]
    fn test_rejects_unknown_key_and_bad_value() {
        let mut config = Config::default();
        assert!(config.set("git.auto_sync", "true").is_err());
        assert!(config.set("timing.rescan_interval_ms", "soon").is_err());
        assert!(config.set("timing.rescan_interval_ms", "0").is_err());
        assert!(config.set("timing.debounce_ms", "0").is_err());
        assert_eq!(config.data.timing.debounce_ms, 1000);
    }

    #[test]
    fn test_zero_timers_in_file_are_rejected() -> StylerResult<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join(CONFIG_FILE);

        fs::write(&path, "[timing]\nrescan_interval_ms = 0\n")?;
        let err = Config::load_or_default(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("timing.rescan_interval_ms"));

        fs::write(&path, "[timing]\ndebounce_ms = 0\nrescan_interval_ms = 500\n")?;
        let err = Config::load_or_default(temp_dir.path()).unwrap_err();
        assert!(err.to_string().contains("timing.debounce_ms"));

        fs::write(&path, "[timing]\ndebounce_ms = 50\nrescan_interval_ms = 500\n")?;
        let config = Config::load_or_default(temp_dir.path())?;
        assert_eq!(config.data.timing.rescan_interval(), std::time::Duration::from_millis(500));

        Ok(())
    }
}
