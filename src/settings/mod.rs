//! Settings consumed by the engine: target class name plus the ordered
//! list of styling rules, exactly as the settings editor stores them.

pub mod store;

pub use store::{JsonFileStore, MemoryStore, SettingsStore};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

use crate::error::{SettingsError, StylerResult};

pub const CLASS_NAME_KEY: &str = "className";
pub const REGEX_CONFIGS_KEY: &str = "regexConfigs";
pub const DEFAULT_CLASS_NAME: &str = "calendar-event-container";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, deserialize_with = "rules", skip_serializing_if = "Option::is_none")]
    pub regex_configs: Option<Vec<RuleConfig>>,
}

impl EngineSettings {
    pub fn from_map(map: Map<String, Value>) -> StylerResult<Self> {
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    pub fn to_map(&self) -> StylerResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    /// The class name and rules to scan with, or `None` when either is
    /// missing and the engine has nothing to do.
    pub fn scan_target(&self) -> Option<(&str, &[RuleConfig])> {
        let class_name = self.class_name.as_deref().filter(|c| !c.is_empty())?;
        let rules = self.regex_configs.as_deref()?;
        Some((class_name, rules))
    }

    pub fn rule_by_name(&self, name: &str) -> Option<&RuleConfig> {
        self.regex_configs
            .as_deref()
            .and_then(|rules| rules.iter().find(|r| r.name == name))
    }

    /// What a fresh editor starts with: the default class name and one
    /// default rule.
    pub fn starter() -> Self {
        Self {
            class_name: Some(DEFAULT_CLASS_NAME.to_string()),
            regex_configs: Some(vec![RuleConfig::starter("Config 1")]),
        }
    }

    /// Validate an imported settings document. `regexConfigs` must be an
    /// array; a missing class name imports as empty.
    pub fn import(value: Value) -> Result<Self, SettingsError> {
        let Value::Object(mut map) = value else {
            return Err(SettingsError::InvalidFormat(
                "expected a JSON object".to_string(),
            ));
        };

        if !map.get(REGEX_CONFIGS_KEY).is_some_and(Value::is_array) {
            return Err(SettingsError::InvalidFormat(format!(
                "\"{}\" must be an array",
                REGEX_CONFIGS_KEY
            )));
        }
        if !map.get(CLASS_NAME_KEY).is_some_and(Value::is_string) {
            map.insert(CLASS_NAME_KEY.to_string(), Value::String(String::new()));
        }

        serde_json::from_value(Value::Object(map))
            .map_err(|e| SettingsError::InvalidFormat(e.to_string()))
    }
}

/// One user-defined styling rule. Absent, null or mistyped fields fall
/// back to disabled effects and the editor's default colors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleConfig {
    pub id: String,
    pub name: String,
    pub pattern: String,
    pub enabled: bool,
    pub enable_background: bool,
    pub background_color: String,
    pub enable_border: bool,
    pub border_color: String,
    pub enable_font_size: bool,
    pub font_size: u32,
    pub enable_font_color: bool,
    pub font_color: String,
    pub enable_badge: bool,
    pub thresholds: Vec<Threshold>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            pattern: String::new(),
            enabled: false,
            enable_background: false,
            background_color: "#ffff00".to_string(),
            enable_border: false,
            border_color: "#ff0000".to_string(),
            enable_font_size: false,
            font_size: 16,
            enable_font_color: false,
            font_color: "#000000".to_string(),
            enable_badge: false,
            thresholds: Vec::new(),
        }
    }
}

impl RuleConfig {
    /// The rule the editor adds by default: enabled, no pattern yet, and
    /// the four stock badge thresholds.
    pub fn starter(name: &str) -> Self {
        Self {
            id: chrono::Utc::now().timestamp_millis().to_string(),
            name: name.to_string(),
            enabled: true,
            thresholds: Threshold::stock(),
            ..Self::default()
        }
    }
}

impl<'de> Deserialize<'de> for RuleConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        let mut rule = RuleConfig::default();

        if let Some(id) = fields.get("id") {
            rule.id = rule_id(id);
        }
        read(&fields, "name", &mut rule.name);
        read(&fields, "pattern", &mut rule.pattern);
        read(&fields, "enabled", &mut rule.enabled);
        read(&fields, "enableBackground", &mut rule.enable_background);
        read(&fields, "backgroundColor", &mut rule.background_color);
        read(&fields, "enableBorder", &mut rule.enable_border);
        read(&fields, "borderColor", &mut rule.border_color);
        read(&fields, "enableFontSize", &mut rule.enable_font_size);
        read(&fields, "fontSize", &mut rule.font_size);
        read(&fields, "enableFontColor", &mut rule.enable_font_color);
        read(&fields, "fontColor", &mut rule.font_color);
        read(&fields, "enableBadge", &mut rule.enable_badge);
        if let Some(raw) = fields.get("thresholds") {
            rule.thresholds = thresholds(raw);
        }

        Ok(rule)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
    Less,
    Greater,
}

impl Operator {
    pub fn parse(symbol: &str) -> Option<Self> {
        match symbol {
            "<=" => Some(Self::LessOrEqual),
            "=" => Some(Self::Equal),
            ">=" => Some(Self::GreaterOrEqual),
            "<" => Some(Self::Less),
            ">" => Some(Self::Greater),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::LessOrEqual => "<=",
            Self::Equal => "=",
            Self::GreaterOrEqual => ">=",
            Self::Less => "<",
            Self::Greater => ">",
        }
    }

    pub fn holds(&self, days: i64, value: i64) -> bool {
        match self {
            Self::LessOrEqual => days <= value,
            Self::Equal => days == value,
            Self::GreaterOrEqual => days >= value,
            Self::Less => days < value,
            Self::Greater => days > value,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Serialize for Operator {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

impl<'de> Deserialize<'de> for Operator {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let symbol = String::deserialize(deserializer)?;
        Operator::parse(&symbol)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown operator \"{}\"", symbol)))
    }
}

/// "If days remaining `operator` `value`, use `color`."
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    pub operator: Operator,
    pub value: i64,
    pub color: String,
}

impl Threshold {
    pub fn new(operator: Operator, value: i64, color: &str) -> Self {
        Self {
            operator,
            value,
            color: color.to_string(),
        }
    }

    pub fn stock() -> Vec<Self> {
        vec![
            Self::new(Operator::LessOrEqual, 1, "#000000"),
            Self::new(Operator::Equal, 2, "#ff0000"),
            Self::new(Operator::LessOrEqual, 4, "#ffa500"),
            Self::new(Operator::Greater, 4, "#008000"),
        ]
    }
}

/// Inbound message surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum Command {
    #[serde(rename = "applyStyles")]
    ApplyStyles,
}

impl Command {
    /// Parse a `{"action": ...}` message. Unknown actions yield `None`.
    pub fn parse(message: &Value) -> Option<Self> {
        serde_json::from_value(message.clone()).ok()
    }
}

/// Overwrite `slot` with `fields[key]` when present and well typed.
fn read<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str, slot: &mut T) {
    match fields.get(key) {
        None | Some(Value::Null) => {}
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(parsed) => *slot = parsed,
            Err(e) => warn!("Ignoring malformed \"{}\" value {}: {}", key, value, e),
        },
    }
}

fn rules<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<RuleConfig>>, D::Error> {
    let Some(raw) = Option::<Vec<Value>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(Some(
        raw.into_iter()
            .filter_map(|value| match serde_json::from_value::<RuleConfig>(value.clone()) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    warn!("Ignoring malformed rule {}: {}", value, e);
                    None
                }
            })
            .collect(),
    ))
}

fn rule_id(value: &Value) -> String {
    match value {
        Value::String(id) => id.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn thresholds(raw: &Value) -> Vec<Threshold> {
    let Value::Array(entries) = raw else {
        if !raw.is_null() {
            warn!("Ignoring thresholds that are not a list: {}", raw);
        }
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|value| match serde_json::from_value::<Threshold>(value.clone()) {
            Ok(threshold) => Some(threshold),
            Err(e) => {
                warn!("Ignoring malformed threshold {}: {}", value, e);
                None
            }
        })
        .collect()
}
