//! Parallel scan driver
//!
//! Each source is scanned on a blocking task; a semaphore bounds how many run
//! at once. Results come back in input order.

use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use strata_domain::EventSink;
use strata_parsers::{AbortHandle, Dispatcher, Source, SourceReport};
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::error::{CliError, Result};

/// Outcome of scanning one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceResult {
    /// The dispatcher ran; plugin outcomes are in the report
    Scanned(SourceReport),
    /// The source could not be read at all
    Failed {
        /// Display name of the source
        source: String,
        /// Cause
        error: String,
    },
}

impl SourceResult {
    /// Events delivered for this source
    pub fn total_events(&self) -> usize {
        match self {
            SourceResult::Scanned(report) => report.total_events(),
            SourceResult::Failed { .. } => 0,
        }
    }
}

/// Runs the dispatcher over many sources concurrently
pub struct ScanDriver {
    dispatcher: Arc<Dispatcher>,
    sink: Arc<dyn EventSink>,
    abort: AbortHandle,
    max_parallel: usize,
}

impl ScanDriver {
    /// Create a driver writing to `sink`
    pub fn new(dispatcher: Arc<Dispatcher>, sink: Arc<dyn EventSink>) -> Self {
        let max_parallel = dispatcher.config().max_parallel_sources.max(1);
        Self {
            dispatcher,
            sink,
            abort: AbortHandle::new(),
            max_parallel,
        }
    }

    /// Handle that stops every running and pending scan
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Scan every source, at most `max_parallel_sources` at a time
    pub async fn run(&self, sources: Vec<Source>) -> Vec<SourceResult> {
        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let mut handles = Vec::with_capacity(sources.len());

        for source in sources {
            let semaphore = Arc::clone(&semaphore);
            let dispatcher = Arc::clone(&self.dispatcher);
            let sink = Arc::clone(&self.sink);
            let abort = self.abort.clone();
            let name = source.display_name();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| e.to_string())?;
                debug!("Scanning {}", source.display_name());
                tokio::task::spawn_blocking(move || dispatcher.scan(&source, sink, &abort))
                    .await
                    .map_err(|e| e.to_string())?
                    .map_err(|e| e.to_string())
            });
            handles.push((name, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (source, handle) in handles {
            let result = match handle.await {
                Ok(Ok(report)) => SourceResult::Scanned(report),
                Ok(Err(error)) => {
                    error!("{}: {}", source, error);
                    SourceResult::Failed { source, error }
                }
                Err(e) => {
                    error!("{}: scan task failed: {}", source, e);
                    SourceResult::Failed {
                        source,
                        error: e.to_string(),
                    }
                }
            };
            results.push(result);
        }
        results
    }
}

/// Expand paths into sources; directories contribute their direct files
///
/// Directory entries are sorted by name. Nested directories are ignored.
pub fn collect_sources(paths: &[PathBuf]) -> Result<Vec<Source>> {
    let mut sources = Vec::new();

    for path in paths {
        if path.is_file() {
            sources.push(Source::file(path));
        } else if path.is_dir() {
            let mut files = fs::read_dir(path)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            files.retain(|p| p.is_file());
            files.sort();
            sources.extend(files.into_iter().map(Source::file));
        } else {
            return Err(CliError::InvalidInput(format!(
                "No such file or directory: {}",
                path.display()
            )));
        }
    }

    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_parsers::{PluginRegistry, ScanConfig};
    use strata_store::MemorySink;

    const BASH: &str = "#1609459200\nls -la\n#1609459260\nwhoami\n";

    fn driver(max_parallel: usize, sink: &Arc<MemorySink>) -> ScanDriver {
        let registry = Arc::new(PluginRegistry::with_default_plugins().unwrap());
        let config = ScanConfig {
            max_parallel_sources: max_parallel,
            ..Default::default()
        };
        let dispatcher = Arc::new(Dispatcher::new(registry, config).unwrap());
        ScanDriver::new(dispatcher, Arc::clone(sink) as Arc<dyn EventSink>)
    }

    #[tokio::test]
    async fn test_results_in_input_order() {
        let sink = Arc::new(MemorySink::new());
        let driver = driver(2, &sink);

        let sources = (0..5)
            .map(|i| Source::bytes(format!("history_{}", i), BASH))
            .collect();
        let results = driver.run(sources).await;

        let names: Vec<_> = results
            .iter()
            .map(|result| match result {
                SourceResult::Scanned(report) => report.source.clone(),
                SourceResult::Failed { source, .. } => source.clone(),
            })
            .collect();
        assert_eq!(
            names,
            vec!["history_0", "history_1", "history_2", "history_3", "history_4"]
        );
        assert_eq!(results.iter().map(SourceResult::total_events).sum::<usize>(), 10);
        assert_eq!(sink.event_count(), 10);
    }

    #[tokio::test]
    async fn test_unreadable_source_fails_alone() {
        let sink = Arc::new(MemorySink::new());
        let driver = driver(4, &sink);

        let sources = vec![
            Source::file("/nonexistent/strata/history"),
            Source::bytes("history", BASH),
        ];
        let results = driver.run(sources).await;

        assert!(matches!(results[0], SourceResult::Failed { .. }));
        assert_eq!(results[1].total_events(), 2);
    }

    #[tokio::test]
    async fn test_abort_stops_extraction() {
        let sink = Arc::new(MemorySink::new());
        let driver = driver(1, &sink);
        driver.abort_handle().abort();

        let results = driver.run(vec![Source::bytes("history", BASH)]).await;

        assert_eq!(results[0].total_events(), 0);
        assert_eq!(sink.event_count(), 0);
    }

    #[test]
    fn test_collect_sources_one_level() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.txt"), "c").unwrap();

        let sources = collect_sources(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = sources
            .iter()
            .filter_map(|s| s.path())
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_collect_sources_missing_path() {
        let result = collect_sources(&[PathBuf::from("/nonexistent/strata")]);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }
}
