mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use veil_config::Config;

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        cli::Commands::Sample(args) => commands::sample::handle(args, &config),
        cli::Commands::Inspect { output, json } => commands::inspect::handle(output, json, &config),
        cli::Commands::Redact(args) => commands::redact::handle(args, &config),
    }
}
