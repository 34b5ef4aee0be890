//! Scan command implementation.

use crate::cli::ScanArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::scanner::{collect_sources, ScanDriver};
use std::sync::Arc;
use strata_domain::EventSink;
use strata_parsers::{Dispatcher, PluginRegistry, ScanConfig};
use strata_store::SqliteEventStore;
use tracing::{info, warn};

/// Scan settings after command-line overrides.
fn scan_config(args: &ScanArgs, config: &Config) -> ScanConfig {
    let mut scan = config.scan.clone();
    if let Some(plugins) = &args.plugins {
        scan.enabled_plugins = Some(plugins.clone());
    }
    if let Some(jobs) = args.jobs {
        scan.max_parallel_sources = jobs;
    }
    scan
}

/// Execute the scan command.
pub async fn execute_scan(args: ScanArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let registry = Arc::new(PluginRegistry::with_default_plugins()?);
    let dispatcher = Arc::new(Dispatcher::new(registry, scan_config(&args, config))?);

    let sources = collect_sources(&args.paths)?;
    if sources.is_empty() {
        return Err(CliError::InvalidInput("No files to scan".to_string()));
    }

    let database = args
        .database
        .clone()
        .unwrap_or_else(|| config.output.database.clone());
    let store = SqliteEventStore::new(&database)?;
    info!(
        "Scan {} writing to {}",
        store.scan_id(),
        database.display()
    );

    let driver = ScanDriver::new(dispatcher, Arc::new(store) as Arc<dyn EventSink>);
    let abort = driver.abort_handle();
    let source_count = sources.len();

    let run = driver.run(sources);
    tokio::pin!(run);

    let results = tokio::select! {
        results = &mut run => results,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupt received, stopping extraction");
            abort.abort();
            (&mut run).await
        }
    };

    println!("{}", formatter.format_scan(&results)?);
    if abort.is_aborted() {
        eprintln!("{}", formatter.warning("Scan interrupted; results are partial"));
    } else {
        eprintln!(
            "{}",
            formatter.success(&format!(
                "Scanned {} source(s) into {}",
                source_count,
                database.display()
            ))
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args() -> ScanArgs {
        ScanArgs {
            paths: vec![PathBuf::from("history")],
            database: None,
            plugins: None,
            jobs: None,
        }
    }

    #[test]
    fn test_overrides_applied() {
        let args = ScanArgs {
            plugins: Some(vec!["bash".to_string()]),
            jobs: Some(8),
            ..args()
        };
        let scan = scan_config(&args, &Config::default());

        assert_eq!(scan.enabled_plugins, Some(vec!["bash".to_string()]));
        assert_eq!(scan.max_parallel_sources, 8);
    }

    #[test]
    fn test_config_kept_without_overrides() {
        let mut config = Config::default();
        config.scan.probe_line_count = 25;

        let scan = scan_config(&args(), &config);
        assert_eq!(scan, config.scan);
    }

    #[tokio::test]
    async fn test_scan_writes_database() {
        let dir = tempfile::tempdir().unwrap();
        let history = dir.path().join(".bash_history");
        std::fs::write(&history, "#1609459200\nls -la\n#1609459260\nwhoami\n").unwrap();
        let database = dir.path().join("timeline.db");

        let args = ScanArgs {
            paths: vec![history],
            database: Some(database.clone()),
            ..args()
        };
        let formatter = Formatter::new(crate::config::OutputFormat::Quiet, false);
        execute_scan(args, &Config::default(), &formatter)
            .await
            .unwrap();

        let store = SqliteEventStore::new(&database).unwrap();
        assert_eq!(store.count_events().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_plugin_rejected() {
        let args = ScanArgs {
            plugins: Some(vec!["nope".to_string()]),
            ..args()
        };
        let formatter = Formatter::new(crate::config::OutputFormat::Quiet, false);
        let result = execute_scan(args, &Config::default(), &formatter).await;

        assert!(matches!(result, Err(CliError::Parse(_))));
    }

    #[tokio::test]
    async fn test_empty_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = ScanArgs {
            paths: vec![dir.path().to_path_buf()],
            ..args()
        };
        let formatter = Formatter::new(crate::config::OutputFormat::Quiet, false);
        let result = execute_scan(args, &Config::default(), &formatter).await;

        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
