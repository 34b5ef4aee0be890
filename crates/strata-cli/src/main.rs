//! Strata CLI - Build forensic timelines from system artifacts.

use clap::Parser;
use strata_cli::commands;
use strata_cli::{Cli, Command, Config, Formatter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> strata_cli::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    // Logs go to stderr so stdout carries only results
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.output.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.output.format);
    let color_enabled = !cli.no_color && config.output.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Scan(args) => commands::execute_scan(args, &config, &formatter).await?,
        Command::Plugins => commands::execute_plugins(&formatter)?,
    }

    Ok(())
}
