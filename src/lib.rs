pub mod config;
pub mod dom;
pub mod engine;
pub mod error;
pub mod settings;

use chrono::NaiveDateTime;
use std::path::Path;

pub use error::{StylerError, StylerResult};

/// One-shot styling of a document with a fixed settings snapshot.
#[derive(Debug, Clone)]
pub struct Styler {
    config: config::Config,
    settings: settings::EngineSettings,
}

impl Styler {
    pub fn new(config: config::Config, settings: settings::EngineSettings) -> Self {
        Self { config, settings }
    }

    /// Load the engine config from `config_dir` and settings from `store`.
    pub fn load(
        config_dir: impl AsRef<Path>,
        store: &impl settings::SettingsStore,
    ) -> StylerResult<Self> {
        let config = config::Config::load_or_default(config_dir)?;
        let settings = store.load()?;
        Ok(Self { config, settings })
    }

    pub fn settings(&self) -> &settings::EngineSettings {
        &self.settings
    }

    pub fn config(&self) -> &config::Config {
        &self.config
    }

    /// Run one scan. `None` when the settings name no class or no rules.
    pub fn apply(&self, doc: &mut dom::Document, now: NaiveDateTime) -> Option<engine::ScanReport> {
        let (class_name, rules) = self.settings.scan_target()?;
        let report = engine::scan::scan(doc, class_name, rules, &self.config.data, now);
        doc.take_mutations();
        Some(report)
    }

    /// Badge for `text` under `rule`, as a matched element would get it.
    pub fn badge(
        &self,
        text: &str,
        rule: &settings::RuleConfig,
        now: NaiveDateTime,
    ) -> Option<engine::Badge> {
        engine::badge::synthesize(text, &rule.thresholds, now, &self.config.data.badge.default_color)
    }

    pub fn clear(&self, doc: &mut dom::Document) -> usize {
        engine::scan::clear_decorations(doc, &self.config.data)
    }
}
