use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use regex_styler::settings::JsonFileStore;

pub fn export(store: &JsonFileStore, file: &Path) -> Result<()> {
    store.export(file).context("Failed to export settings")?;
    println!(
        "{} Configuration exported to {}",
        "✓".bright_green(),
        file.display()
    );
    Ok(())
}

pub fn import(store: &JsonFileStore, file: &Path) -> Result<()> {
    let settings = store.import(file).context("Failed to import settings")?;
    let rules = settings.regex_configs.as_ref().map_or(0, Vec::len);
    println!(
        "{} Configuration imported: {} rule(s), class \"{}\"",
        "✓".bright_green(),
        rules,
        settings.class_name.as_deref().unwrap_or("")
    );
    Ok(())
}
