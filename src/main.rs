mod cli;

use anyhow::Result;
use clap::Parser;
use cli::commands;

fn main() {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = cli::Cli::parse();

    // Run the command and handle errors gracefully
    if let Err(err) = run_command(cli) {
        commands::display_error(&err);
        std::process::exit(1);
    }
}

fn run_command(cli: cli::Cli) -> Result<()> {
    use cli::Commands;

    let store = commands::open_store(cli.settings);

    match cli.command {
        Commands::Init { force } => commands::init::handle(&store, force),
        Commands::Apply { document, out, now } => {
            commands::apply::handle(&store, &document, out, now.as_deref())
        }
        Commands::Badge { text, rule, now } => {
            commands::badge::handle(&store, &text, rule.as_deref(), now.as_deref())
        }
        Commands::Check => commands::check::handle(&store),
        Commands::Export { file } => commands::transfer::export(&store, &file),
        Commands::Import { file } => commands::transfer::import(&store, &file),
        Commands::Config { action } => commands::config::handle(&store, action),
        Commands::Watch { document, out } => commands::watch::handle(&store, &document, out),
    }
}
