use anyhow::{Context, Result};
use colored::Colorize;
use regex_styler::config::{Config, CONFIG_FILE};
use regex_styler::settings::{EngineSettings, JsonFileStore};

use super::config_dir;

pub fn handle(store: &JsonFileStore, force: bool) -> Result<()> {
    println!("{}", "Initializing regex-styler...".bright_blue().bold());
    println!();

    if store.path().exists() && !force {
        println!(
            "  {} Settings already exist at {}",
            "ℹ".bright_blue(),
            store.path().display()
        );
        println!("    Use {} to overwrite them", "--force".bright_cyan());
    } else {
        store
            .save(&EngineSettings::starter())
            .context("Failed to write starter settings")?;
        println!(
            "  {} Wrote starter settings to {}",
            "✓".bright_green(),
            store.path().display()
        );
    }

    let dir = config_dir(store);
    Config::init(&dir).context("Failed to write engine config")?;
    println!(
        "  {} Engine config at {}",
        "✓".bright_green(),
        dir.join(CONFIG_FILE).display()
    );

    println!("\n{}", "Quick start:".bright_blue().bold());
    println!("  1. Set a pattern on the starter rule in the settings file");
    println!("  2. Run {}", "regex-styler apply --document page.json".bright_yellow());

    Ok(())
}
