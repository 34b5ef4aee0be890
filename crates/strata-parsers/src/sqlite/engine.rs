//! Runs a relational plugin's queries against one source

use tracing::{debug, info};

use crate::cache::ResultCache;
use crate::error::ParseError;
use crate::mediator::ParserMediator;
use crate::sqlite::{QueryDefinition, RowContext, SqliteDatabase, SqlitePlugin};
use crate::types::ExtractionStats;

/// Query driver for one (plugin, source) pair
pub struct QueryEngine<'p> {
    plugin: &'p dyn SqlitePlugin,
}

impl<'p> QueryEngine<'p> {
    /// Create an engine for `plugin`
    pub fn new(plugin: &'p dyn SqlitePlugin) -> Self {
        Self { plugin }
    }

    /// Fail with [`ParseError::SchemaIncompatible`] unless every required table exists
    pub fn check_schema(&self, database: &SqliteDatabase) -> Result<(), ParseError> {
        let missing = database.missing_tables(self.plugin.required_tables())?;
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ParseError::SchemaIncompatible(missing))
        }
    }

    /// Run every query of the plugin, in declaration order
    ///
    /// The schema is checked again here since the source may have changed
    /// since selection. Each invocation gets its own result cache. A query
    /// that does not fit the source's columns produces a warning and the
    /// next query still runs.
    pub fn run(
        &self,
        database: &SqliteDatabase,
        mediator: &mut ParserMediator,
    ) -> Result<ExtractionStats, ParseError> {
        self.check_schema(database)?;

        let mut cache = ResultCache::new();
        let mut stats = ExtractionStats::default();

        for query in self.plugin.queries() {
            if mediator.abort() {
                stats.aborted = true;
                break;
            }
            match self.run_query(query, database, mediator, &mut cache, &mut stats) {
                Ok(()) => {}
                Err(ParseError::Query(reason)) => {
                    debug!("{}: query {} failed: {}", self.plugin.name(), query.name, reason);
                    mediator.produce_extraction_warning(format!(
                        "unable to run query {}: {}",
                        query.name, reason
                    ))?;
                    stats.failed_queries += 1;
                }
                Err(e) => return Err(e),
            }
        }

        stats.cache_builds = cache.build_count();
        info!(
            "{}: {} rows from {} ({} skipped)",
            self.plugin.name(),
            stats.records,
            database.name(),
            stats.skipped
        );
        Ok(stats)
    }

    fn run_query(
        &self,
        query: &QueryDefinition,
        database: &SqliteDatabase,
        mediator: &mut ParserMediator,
        cache: &mut ResultCache,
        stats: &mut ExtractionStats,
    ) -> Result<(), ParseError> {
        debug!("{}: running query {}", self.plugin.name(), query.name);

        let mut context = RowContext {
            mediator,
            cache,
            database,
            query: query.sql,
        };

        database.for_each_row(query.sql, |row| {
            if context.mediator.abort() {
                stats.aborted = true;
                return Ok(false);
            }
            stats.records += 1;

            match (query.handler)(&mut context, row) {
                Ok(()) => Ok(true),
                Err(e) if e.is_fatal() => Err(e),
                Err(e) => {
                    context.mediator.produce_extraction_warning(format!(
                        "unable to parse row of {}: {}",
                        query.name, e
                    ))?;
                    stats.skipped += 1;
                    Ok(true)
                }
            }
        })
    }
}
