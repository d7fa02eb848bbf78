pub mod apply;
pub mod badge;
pub mod check;
pub mod config;
pub mod init;
pub mod transfer;
pub mod watch;

use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveDateTime};
use colored::Colorize;
use std::path::{Path, PathBuf};

use regex_styler::settings::JsonFileStore;

/// Settings store at `path`, or at the per-user default location.
pub fn open_store(path: Option<PathBuf>) -> JsonFileStore {
    JsonFileStore::new(path.unwrap_or_else(JsonFileStore::default_path))
}

/// Engine config lives next to the settings file.
pub fn config_dir(store: &JsonFileStore) -> PathBuf {
    store
        .path()
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn parse_now(now: Option<&str>) -> Result<NaiveDateTime> {
    let Some(value) = now else {
        return Ok(chrono::Local::now().naive_local());
    };

    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Ok(datetime);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }
    bail!("Invalid reference time: {} (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)", value)
}

/// Display an error message with proper formatting
pub fn display_error(err: &anyhow::Error) {
    if let Some(styler_error) = err.downcast_ref::<regex_styler::StylerError>() {
        regex_styler::error::display_error(styler_error);
        return;
    }

    eprintln!("\n{} {}", "✗".bright_red().bold(), "Operation failed".bright_red().bold());
    eprintln!("  {} {}", "├".bright_black(), err);

    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", "├".bright_black(), cause);
    }

    let error_str = err.to_string();
    if error_str.contains("No such file") {
        eprintln!("  {} Check that the file path is correct", "└".bright_cyan());
    } else {
        eprintln!(
            "  {} Set {} for more details",
            "└".bright_black(),
            "RUST_LOG=debug".bright_cyan()
        );
    }
}
