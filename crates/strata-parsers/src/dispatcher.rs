//! Routes each source to the plugins able to read it

use std::sync::Arc;

use strata_domain::EventSink;
use tracing::{debug, info, warn};

use crate::config::ScanConfig;
use crate::error::ParseError;
use crate::mediator::{AbortHandle, ParserMediator};
use crate::registry::{Plugin, PluginKind, PluginRegistry, RegistryError};
use crate::source::Source;
use crate::sqlite::{QueryEngine, SqliteDatabase, SqlitePlugin};
use crate::text::{extract_text, ProbeSample, TextPlugin};
use crate::types::{ExtractionStats, PluginOutcome, PluginRun, ScanState, SourceReport};

/// Selects plugins for a source and runs each one in isolation
///
/// Every (plugin, source) pair gets its own mediator and, for relational
/// sources, its own result cache. A fatal error in one plugin marks that
/// plugin skipped and never affects the others.
pub struct Dispatcher {
    registry: Arc<PluginRegistry>,
    config: ScanConfig,
}

impl Dispatcher {
    /// Create a dispatcher; fails on invalid configuration or unknown plugin names
    pub fn new(registry: Arc<PluginRegistry>, config: ScanConfig) -> Result<Self, ParseError> {
        config.validate().map_err(ParseError::Config)?;
        if let Some(enabled) = &config.enabled_plugins {
            if let Some(unknown) = enabled.iter().find(|name| registry.get(name).is_none()) {
                return Err(RegistryError::UnknownPlugin(unknown.clone()).into());
            }
        }
        Ok(Self { registry, config })
    }

    /// The plugin registry
    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// The scan configuration
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    fn is_enabled(&self, name: &str) -> bool {
        match &self.config.enabled_plugins {
            Some(enabled) => enabled.iter().any(|n| n == name),
            None => true,
        }
    }

    /// Scan one source with every plugin that accepts it
    ///
    /// Errors are returned only when the source itself cannot be read.
    /// Plugin failures are reported in the returned [`SourceReport`].
    pub fn scan(
        &self,
        source: &Source,
        sink: Arc<dyn EventSink>,
        abort: &AbortHandle,
    ) -> Result<SourceReport, ParseError> {
        debug!("{}: {:?}", source.display_name(), ScanState::Unprobed);
        if source.is_sqlite()? {
            let database = source.open_database()?;
            self.scan_database(&database, &source.display_name(), sink, abort)
        } else {
            self.scan_text(source, sink, abort)
        }
    }

    /// Text plugins whose verification accepts the source
    pub fn select_text_plugins(&self, source: &Source) -> Result<Vec<&dyn TextPlugin>, ParseError> {
        let sample = ProbeSample::read(
            source.open()?,
            self.config.probe_window(),
            self.config.max_line_length,
        )?;
        let Some(sample) = sample else {
            debug!("{}: not a text source", source.display_name());
            return Ok(Vec::new());
        };

        Ok(self
            .registry
            .plugins()
            .filter(|plugin| self.is_enabled(plugin.name()))
            .filter_map(|plugin| match plugin {
                Plugin::Text(plugin) => Some(&**plugin),
                Plugin::Sqlite(_) => None,
            })
            .filter(|plugin| sample.verify_with(*plugin, &self.config))
            .collect())
    }

    /// Relational plugins whose required tables all exist
    pub fn select_sqlite_plugins(
        &self,
        database: &SqliteDatabase,
    ) -> Result<Vec<&dyn SqlitePlugin>, ParseError> {
        let tables = database.table_names()?;
        Ok(self
            .registry
            .plugins()
            .filter(|plugin| self.is_enabled(plugin.name()))
            .filter_map(|plugin| match plugin {
                Plugin::Sqlite(plugin) => Some(&**plugin),
                Plugin::Text(_) => None,
            })
            .filter(|plugin| {
                plugin
                    .required_tables()
                    .iter()
                    .all(|table| tables.contains(*table))
            })
            .collect())
    }

    /// Scan an open database with every relational plugin that accepts it
    pub fn scan_database(
        &self,
        database: &SqliteDatabase,
        source_name: &str,
        sink: Arc<dyn EventSink>,
        abort: &AbortHandle,
    ) -> Result<SourceReport, ParseError> {
        let plugins = self.select_sqlite_plugins(database)?;
        let mut report = SourceReport {
            source: source_name.to_string(),
            runs: Vec::new(),
        };

        for plugin in plugins {
            let chain = parser_chain(PluginKind::Sqlite, plugin.name());
            let mut mediator =
                ParserMediator::new(Arc::clone(&sink), chain.as_str(), source_name, abort.clone());
            transition(&mediator, ScanState::Selected);
            transition(&mediator, ScanState::Extracting);

            let result = QueryEngine::new(plugin).run(database, &mut mediator);
            report.runs.push(finish(mediator, chain, result));
        }

        Ok(report)
    }

    fn scan_text(
        &self,
        source: &Source,
        sink: Arc<dyn EventSink>,
        abort: &AbortHandle,
    ) -> Result<SourceReport, ParseError> {
        let source_name = source.display_name();
        let plugins = self.select_text_plugins(source)?;
        let mut report = SourceReport {
            source: source_name.clone(),
            runs: Vec::new(),
        };

        for plugin in plugins {
            let chain = parser_chain(PluginKind::Text, plugin.name());
            let mut mediator =
                ParserMediator::new(Arc::clone(&sink), chain.as_str(), &*source_name, abort.clone());
            transition(&mediator, ScanState::Selected);
            transition(&mediator, ScanState::Extracting);

            let result = source
                .open()
                .and_then(|reader| extract_text(plugin, reader, &mut mediator));
            report.runs.push(finish(mediator, chain, result));
        }

        Ok(report)
    }
}

fn parser_chain(kind: PluginKind, name: &str) -> String {
    format!("{}/{}", kind.as_str(), name)
}

fn transition(mediator: &ParserMediator, state: ScanState) {
    debug!("{}: {} -> {:?}", mediator.source(), mediator.parser_chain(), state);
}

fn finish(
    mediator: ParserMediator,
    parser_chain: String,
    result: Result<ExtractionStats, ParseError>,
) -> PluginRun {
    let outcome = match result {
        Ok(stats) => {
            if stats.aborted {
                info!("{}: {} aborted", mediator.source(), parser_chain);
            }
            info!(
                "{}: {} produced {} events",
                mediator.source(),
                parser_chain,
                mediator.events_produced()
            );
            PluginOutcome::Done {
                events: mediator.events_produced(),
                warnings: mediator.warnings_produced(),
                stats,
            }
        }
        Err(e) => {
            warn!("{}: {} skipped: {}", mediator.source(), parser_chain, e);
            PluginOutcome::Skipped {
                reason: e.to_string(),
                events: mediator.events_produced(),
                warnings: mediator.warnings_produced(),
            }
        }
    };
    transition(&mediator, outcome.state());

    PluginRun {
        parser_chain,
        outcome,
    }
}
