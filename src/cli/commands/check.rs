use anyhow::{bail, Context, Result};
use colored::Colorize;

use regex_styler::engine::matcher;
use regex_styler::settings::{JsonFileStore, SettingsStore};

pub fn handle(store: &JsonFileStore) -> Result<()> {
    println!("{}", "Checking rule patterns...".bright_blue());

    let settings = store.load().context("Failed to load settings")?;
    let Some((class_name, rules)) = settings.scan_target() else {
        println!(
            "{} Settings have no class name or no rules; nothing to check",
            "⚠".bright_yellow()
        );
        return Ok(());
    };

    println!("  Target class: {}", class_name.bright_cyan());

    let mut failures = 0;
    for rule in rules {
        if !rule.enabled {
            println!("  {} {} (disabled)", "-".bright_black(), rule.name);
            continue;
        }
        if rule.pattern.is_empty() {
            println!("  {} {} (no pattern)", "-".bright_black(), rule.name);
            continue;
        }

        match matcher::compile(rule) {
            Ok(_) => println!("  {} {} /{}/i", "✓".bright_green(), rule.name, rule.pattern),
            Err(e) => {
                failures += 1;
                println!("  {} {}", "✗".bright_red(), e);
                if let Some(hint) = e.hint() {
                    println!("    {} {}", "→".bright_cyan(), hint);
                }
            }
        }

        if rule.enable_badge && rule.thresholds.is_empty() {
            println!(
                "    {} badges enabled but no thresholds; every badge will be gray",
                "⚠".bright_yellow()
            );
        }
    }

    if failures > 0 {
        bail!("{} rule pattern(s) failed to compile", failures);
    }

    println!("{} All enabled patterns compile", "✓".bright_green());
    Ok(())
}
