//! CLI command definitions and argument parsing.

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Strata - Build forensic timelines from system artifacts.
#[derive(Debug, Parser)]
#[command(name = "strata")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "STRATA_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Plain summary lines
    Quiet,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => OutputFormat::Table,
            CliFormat::Json => OutputFormat::Json,
            CliFormat::Quiet => OutputFormat::Quiet,
        }
    }
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract events from files into the event database
    Scan(ScanArgs),

    /// List registered format plugins
    Plugins,
}

/// Arguments for the scan command.
#[derive(Debug, Parser)]
pub struct ScanArgs {
    /// Files or directories to scan (directories are read one level deep)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Event database path (overrides the configured one)
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Only run these plugins (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub plugins: Option<Vec<String>>,

    /// Sources scanned concurrently
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan() {
        let cli = Cli::try_parse_from([
            "strata",
            "scan",
            "/var/log",
            "history.txt",
            "--plugins",
            "bash,zsh_extended_history",
            "--database",
            "out.db",
        ])
        .unwrap();

        match cli.command {
            Command::Scan(args) => {
                assert_eq!(args.paths.len(), 2);
                assert_eq!(
                    args.plugins,
                    Some(vec!["bash".to_string(), "zsh_extended_history".to_string()])
                );
                assert_eq!(args.database, Some(PathBuf::from("out.db")));
                assert_eq!(args.jobs, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_scan_requires_paths() {
        assert!(Cli::try_parse_from(["strata", "scan"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["strata", "plugins", "--format", "json", "--no-color"]).unwrap();

        assert!(matches!(cli.command, Command::Plugins));
        assert_eq!(cli.format, Some(CliFormat::Json));
        assert!(cli.no_color);
    }
}
