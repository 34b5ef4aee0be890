//! Error types for extraction

use strata_domain::{SinkError, TimestampError};
use thiserror::Error;

use crate::registry::RegistryError;

/// Errors that can occur during extraction
///
/// Errors local to one record, row or query ([`ParseError::MalformedRecord`],
/// [`ParseError::InvalidTimestamp`], [`ParseError::Query`]) are reported as
/// warnings and the scan continues. Every other variant stops the current
/// plugin invocation only.
#[derive(Error, Debug)]
pub enum ParseError {
    /// The source is not in a format this plugin understands
    #[error("Format mismatch: {0}")]
    FormatMismatch(String),

    /// A record or row has a shape the plugin does not recognize
    #[error("Unable to parse record, unknown structure: {0}")]
    Structure(String),

    /// A declared query does not fit the source's schema
    #[error("Unable to run query: {0}")]
    Query(String),

    /// Required tables are absent from the relational source
    #[error("Schema incompatible, missing tables: {}", .0.join(", "))]
    SchemaIncompatible(Vec<String>),

    /// A single record is empty or corrupt
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// A timestamp value is out of representable range
    #[error(transparent)]
    InvalidTimestamp(#[from] TimestampError),

    /// The event sink rejected a write
    #[error(transparent)]
    Sink(#[from] SinkError),

    /// Relational source error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error while reading a source
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record grammar failed to compile
    #[error("Grammar error: {0}")]
    Grammar(#[from] regex::Error),

    /// Plugin registry error
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ParseError {
    /// Whether this error ends the current plugin invocation
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ParseError::MalformedRecord(_)
                | ParseError::InvalidTimestamp(_)
                | ParseError::Query(_)
        )
    }
}
