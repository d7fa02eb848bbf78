use directories::ProjectDirs;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::EngineSettings;
use crate::error::{ErrorContext, SettingsError, StylerResult};

pub const SETTINGS_FILE: &str = "settings.json";

/// Key-value settings storage the engine reads from.
pub trait SettingsStore {
    /// Fetch the requested keys, or everything when `keys` is `None`.
    /// Keys that are not stored are simply absent from the result.
    fn get(&self, keys: Option<&[&str]>) -> StylerResult<Map<String, Value>>;

    fn load(&self) -> StylerResult<EngineSettings> {
        EngineSettings::from_map(self.get(None)?)
    }
}

fn select(all: Map<String, Value>, keys: Option<&[&str]>) -> Map<String, Value> {
    match keys {
        None => all,
        Some(keys) => all
            .into_iter()
            .filter(|(key, _)| keys.contains(&key.as_str()))
            .collect(),
    }
}

/// Shared in-memory store. Clones share the same data, so a test can keep
/// a handle and change settings under a running orchestrator.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Rc<RefCell<Map<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: &EngineSettings) -> StylerResult<Self> {
        let store = Self::new();
        store.replace(settings)?;
        Ok(store)
    }

    pub fn set(&self, key: &str, value: Value) {
        self.data.borrow_mut().insert(key.to_string(), value);
    }

    pub fn replace(&self, settings: &EngineSettings) -> StylerResult<()> {
        *self.data.borrow_mut() = settings.to_map()?;
        Ok(())
    }

    pub fn clear(&self) {
        self.data.borrow_mut().clear();
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, keys: Option<&[&str]>) -> StylerResult<Map<String, Value>> {
        Ok(select(self.data.borrow().clone(), keys))
    }
}

/// Settings kept in a JSON file. A missing file reads as empty settings.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Directory holding the settings file and engine config by default.
    pub fn default_dir() -> PathBuf {
        ProjectDirs::from("dev", "regex-styler", "regex-styler")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".regex-styler"))
    }

    pub fn default_path() -> PathBuf {
        Self::default_dir().join(SETTINGS_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, settings: &EngineSettings) -> StylerResult<()> {
        let content = serde_json::to_string_pretty(settings)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).context("Failed to create settings directory")?;
            }
        }

        fs::write(&self.path, content).context("Failed to write settings file")?;
        Ok(())
    }

    pub fn clear(&self) -> StylerResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).context("Failed to remove settings file")?;
        }
        Ok(())
    }

    /// Write the current settings to `target` as pretty JSON.
    pub fn export(&self, target: &Path) -> StylerResult<()> {
        let settings = self.load()?;
        fs::write(target, serde_json::to_string_pretty(&settings)?)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        Ok(())
    }

    /// Replace the stored settings with the validated contents of `source`.
    pub fn import(&self, source: &Path) -> StylerResult<EngineSettings> {
        let content = fs::read_to_string(source)
            .with_context(|| format!("Failed to read {}", source.display()))?;
        let value: Value = serde_json::from_str(&content)
            .map_err(|e| SettingsError::Malformed(e.to_string()))?;

        let settings = EngineSettings::import(value)?;
        self.save(&settings)?;
        Ok(settings)
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, keys: Option<&[&str]>) -> StylerResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| SettingsError::AccessError {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let all = match serde_json::from_str(&content)
            .map_err(|e| SettingsError::Malformed(e.to_string()))?
        {
            Value::Object(map) => map,
            _ => {
                return Err(SettingsError::Malformed("expected a JSON object".to_string()).into())
            }
        };

        Ok(select(all, keys))
    }
}
