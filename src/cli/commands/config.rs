use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli::ConfigAction;
use regex_styler::config::Config;
use regex_styler::settings::JsonFileStore;

use super::config_dir;

pub fn handle(store: &JsonFileStore, action: ConfigAction) -> Result<()> {
    let mut config =
        Config::load_or_default(config_dir(store)).context("Failed to load engine config")?;

    match action {
        ConfigAction::Set { key, value } => {
            println!(
                "{} Setting {} = {}",
                "→".bright_green(),
                key.bright_cyan(),
                value.bright_yellow()
            );
            config.set(&key, &value)?;
            println!("{} Configuration updated", "✓".bright_green());
        }

        ConfigAction::Get { key } => {
            let value = config.get(&key)?;
            println!("{} = {}", key.bright_cyan(), value);
        }

        ConfigAction::List => {
            println!("{}", "Current Configuration:".bright_blue().bold());
            println!("  {}", config.path.display().to_string().bright_black());
            for key in Config::keys() {
                let value = config.get(key)?;
                println!("  {} = {}", key.bright_cyan(), value.bright_yellow());
            }
        }
    }

    Ok(())
}
