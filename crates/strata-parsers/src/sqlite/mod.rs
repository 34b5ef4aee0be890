//! Relational-format plugins: schema checks, queries, row handlers

mod database;
mod engine;

pub use database::{QueryRow, SqliteDatabase, SQLITE_MAGIC};
pub use engine::QueryEngine;

use crate::cache::ResultCache;
use crate::error::ParseError;
use crate::mediator::ParserMediator;

/// Handler invoked once per row of a query
pub type RowHandler = fn(&mut RowContext<'_>, &QueryRow<'_>) -> Result<(), ParseError>;

/// A query and the handler that interprets its rows
#[derive(Clone, Copy)]
pub struct QueryDefinition {
    /// Short name used in logs and warnings
    pub name: &'static str,
    /// SQL text; also recorded on every event it produces
    pub sql: &'static str,
    /// Row handler
    pub handler: RowHandler,
}

/// Everything a row handler may touch
pub struct RowContext<'a> {
    /// Event and warning output
    pub mediator: &'a mut ParserMediator,
    /// Auxiliary results for this invocation
    pub cache: &'a mut ResultCache,
    /// The source being read
    pub database: &'a SqliteDatabase,
    /// SQL text of the query that produced the current row
    pub query: &'static str,
}

/// A plugin that extracts events from a relational source
pub trait SqlitePlugin: Send + Sync {
    /// Unique plugin name
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Tables that must all exist for the plugin to accept a source
    fn required_tables(&self) -> &'static [&'static str];

    /// Queries run in order against an accepted source
    fn queries(&self) -> &'static [QueryDefinition];
}
