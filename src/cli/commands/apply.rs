use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use regex_styler::dom::Document;
use regex_styler::settings::JsonFileStore;
use regex_styler::Styler;

use super::{config_dir, parse_now};

pub fn handle(
    store: &JsonFileStore,
    document: &Path,
    out: Option<PathBuf>,
    now: Option<&str>,
) -> Result<()> {
    let now = parse_now(now)?;
    let styler = Styler::load(config_dir(store), store)
        .context("Failed to load regex-styler settings")?;

    let content = std::fs::read_to_string(document)
        .with_context(|| format!("Failed to read page snapshot: {}", document.display()))?;
    let mut doc = Document::from_json(&content)
        .with_context(|| format!("Invalid page snapshot: {}", document.display()))?;

    let Some(report) = styler.apply(&mut doc, now) else {
        println!(
            "{} Settings have no class name or no rules; nothing to do",
            "ℹ".bright_blue()
        );
        return Ok(());
    };

    eprintln!("{}", "Scan report".bright_blue().bold());
    eprintln!("  targets:   {}", report.targets);
    eprintln!("  decorated: {}", report.decorated);
    eprintln!("  badges:    {}", report.badges);
    eprintln!("  rules:     {}", report.rules_applied);
    for error in &report.errors {
        eprintln!("  {} {}", "✗".bright_red(), error);
    }
    if !report.found_targets() {
        eprintln!(
            "  {} No elements carry the configured class",
            "⚠".bright_yellow()
        );
    }

    let html = doc.to_html();
    match out {
        Some(path) => {
            std::fs::write(&path, html)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("{} Wrote {}", "✓".bright_green(), path.display());
        }
        None => println!("{}", html),
    }

    Ok(())
}
