use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for styler operations
#[derive(Error, Debug)]
pub enum StylerError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// A rule whose pattern failed to compile.
///
/// Never fatal for a scan: the matcher logs it, records it in the scan
/// report and moves on to the next rule.
#[derive(Error, Debug, Clone)]
#[error("Invalid regex pattern in config \"{rule}\": {source}")]
pub struct PatternError {
    pub rule: String,
    pub rule_id: String,
    #[source]
    pub source: regex::Error,
}

impl PatternError {
    /// Explanation for browser-style regex syntax this engine rejects.
    pub fn hint(&self) -> Option<&'static str> {
        let message = self.source.to_string();
        if message.contains("look-around") {
            Some("look-ahead and look-behind are not supported; rewrite the pattern without them")
        } else if message.contains("backreferences") {
            Some("backreferences such as \\1 are not supported; repeat the group instead")
        } else {
            None
        }
    }
}

/// Settings store errors
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to access settings at {path:?}: {message}")]
    AccessError { path: PathBuf, message: String },

    #[error("Settings file is not valid JSON: {0}")]
    Malformed(String),

    #[error("Invalid configuration format: {0}")]
    InvalidFormat(String),
}

/// Engine configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Result type alias for styler operations
pub type StylerResult<T> = Result<T, StylerError>;

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    fn context<C>(self, context: C) -> StylerResult<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    fn with_context<C, F>(self, f: F) -> StylerResult<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> ErrorContext<T> for StylerResult<T> {
    fn context<C>(self, context: C) -> StylerResult<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| StylerError::InvalidInput(format!("{}: {}", context, e)))
    }

    fn with_context<C, F>(self, f: F) -> StylerResult<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| StylerError::InvalidInput(format!("{}: {}", f(), e)))
    }
}

impl<T> ErrorContext<T> for Result<T, io::Error> {
    fn context<C>(self, context: C) -> StylerResult<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| StylerError::Io(io::Error::new(e.kind(), format!("{}: {}", context, e))))
    }

    fn with_context<C, F>(self, f: F) -> StylerResult<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| StylerError::Io(io::Error::new(e.kind(), format!("{}: {}", f(), e))))
    }
}

/// Error display helper for CLI
pub fn display_error(error: &StylerError) {
    use colored::Colorize;
    use std::error::Error;

    eprintln!("\n{} {}", "✗".bright_red().bold(), "Operation failed".bright_red().bold());
    eprintln!("  {} {}", "├".bright_black(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} Caused by: {}", "├".bright_black(), err);
        source = err.source();
    }

    match error {
        StylerError::Settings(SettingsError::InvalidFormat(_)) => {
            eprintln!("  {} Settings must contain a \"regexConfigs\" array", "└".bright_cyan());
        }
        StylerError::Settings(SettingsError::AccessError { path, .. }) => {
            eprintln!("  {} Check that {:?} exists and is readable", "└".bright_cyan(), path);
            eprintln!("    Try: regex-styler init");
        }
        StylerError::Pattern(pattern) => {
            if let Some(hint) = pattern.hint() {
                eprintln!("  {} {}", "├".bright_black(), hint);
            }
            eprintln!("  {} Fix the pattern of rule \"{}\"", "└".bright_cyan(), pattern.rule);
        }
        _ => {
            eprintln!("  {} Set RUST_LOG=debug for more details", "└".bright_black());
        }
    }
}
