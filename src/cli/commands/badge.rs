use anyhow::{Context, Result};
use colored::Colorize;

use regex_styler::settings::{JsonFileStore, RuleConfig};
use regex_styler::Styler;

use super::{config_dir, parse_now};

pub fn handle(store: &JsonFileStore, text: &str, rule: Option<&str>, now: Option<&str>) -> Result<()> {
    let now = parse_now(now)?;
    let styler = Styler::load(config_dir(store), store)
        .context("Failed to load regex-styler settings")?;

    let rule = match rule {
        Some(name) => styler
            .settings()
            .rule_by_name(name)
            .cloned()
            .with_context(|| format!("No rule named \"{}\" in {}", name, store.path().display()))?,
        None => RuleConfig::starter("default"),
    };

    match styler.badge(text, &rule, now) {
        Some(badge) => {
            let shape = if badge.square { "square" } else { "round" };
            println!(
                "{} {} ({}, {})",
                "●".bright_green(),
                badge.label.bold(),
                badge.color,
                shape
            );
        }
        None => {
            println!("{} No DD/MM date in \"{}\"", "ℹ".bright_blue(), text);
        }
    }

    Ok(())
}
