pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "regex-styler")]
#[command(about = "Highlight page elements matching your regexes and badge them with days remaining", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(short, long, global = true, env = "REGEX_STYLER_SETTINGS", help = "Settings JSON file")]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Write starter settings and engine config")]
    Init {
        #[arg(short, long, help = "Overwrite existing settings")]
        force: bool,
    },

    #[command(about = "Scan a page snapshot once and print the decorated page")]
    Apply {
        #[arg(short, long, help = "Page snapshot (JSON)")]
        document: PathBuf,
        #[arg(short, long, help = "Write decorated HTML here instead of stdout")]
        out: Option<PathBuf>,
        #[arg(long, help = "Reference time, e.g. 2024-03-15 or 2024-03-15T09:30:00")]
        now: Option<String>,
    },

    #[command(about = "Compute the days-remaining badge for a piece of text")]
    Badge {
        #[arg(help = "Text containing a DD/MM date")]
        text: String,
        #[arg(short, long, help = "Use the thresholds of this rule (by name)")]
        rule: Option<String>,
        #[arg(long, help = "Reference time, e.g. 2024-03-15 or 2024-03-15T09:30:00")]
        now: Option<String>,
    },

    #[command(about = "Check that every enabled rule pattern compiles")]
    Check,

    #[command(about = "Export settings to a JSON file")]
    Export {
        #[arg(help = "Destination file")]
        file: PathBuf,
    },

    #[command(about = "Import settings from a JSON file")]
    Import {
        #[arg(help = "Source file")]
        file: PathBuf,
    },

    #[command(about = "Configure engine settings")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    #[command(about = "Watch a page snapshot and keep it decorated")]
    Watch {
        #[arg(short, long, help = "Page snapshot (JSON)")]
        document: PathBuf,
        #[arg(short, long, help = "Write decorated HTML here after every scan")]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    #[command(about = "Set a configuration value")]
    Set {
        key: String,
        value: String,
    },
    #[command(about = "Get a configuration value")]
    Get {
        key: String,
    },
    #[command(about = "List all configuration values")]
    List,
}
