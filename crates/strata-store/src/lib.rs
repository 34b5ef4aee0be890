//! Strata Storage Layer
//!
//! Implements the [`EventSink`] trait so produced events outlive the
//! extraction run.
//!
//! # Architecture
//!
//! - [`SqliteEventStore`]: durable storage, one row per event, attributes as JSON
//! - [`MemorySink`]: in-process collection, used by tests and dry runs
//!
//! # Examples
//!
//! ```no_run
//! use strata_store::SqliteEventStore;
//!
//! let store = SqliteEventStore::new(":memory:").unwrap();
//! // Store is now ready to receive events
//! ```

#![warn(missing_docs)]

mod memory;

pub use memory::MemorySink;

use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use strata_domain::{
    Event, EventSink, ExtractionWarning, SinkError, Timestamp, TimestampRole,
};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Attribute serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The connection lock was poisoned by a panicking writer
    #[error("Lock error: {0}")]
    Lock(String),
}

/// An event as read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvent {
    /// When the fact happened
    pub timestamp: Timestamp,

    /// What the timestamp means
    pub timestamp_role: TimestampRole,

    /// Data type tag of the payload
    pub data_type: String,

    /// Parser chain that produced the event
    pub parser_chain: String,

    /// Display name of the input source
    pub source: String,

    /// Source-relative locator
    pub offset: Option<i64>,

    /// Query that produced the event, for relational sources
    pub query: Option<String>,

    /// Format-specific attributes, including `data_type`
    pub attributes: serde_json::Value,
}

/// SQLite-based implementation of [`EventSink`]
///
/// Every store instance tags the rows it writes with a UUIDv7 scan identifier,
/// so several runs can share one database file.
///
/// # Thread Safety
///
/// The connection sits behind a mutex; concurrent extraction invocations may
/// share one store through an `Arc`.
pub struct SqliteEventStore {
    conn: Mutex<Connection>,
    scan_id: String,
}

impl SqliteEventStore {
    /// Create a new SqliteEventStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use strata_store::SqliteEventStore;
    ///
    /// let store = SqliteEventStore::new("timeline.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;

        Ok(Self {
            conn: Mutex::new(conn),
            scan_id: uuid::Uuid::now_v7().to_string(),
        })
    }

    /// Identifier tagging every row written by this store instance
    pub fn scan_id(&self) -> &str {
        &self.scan_id
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    /// Persist one event
    pub fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        let data = event.data();
        let attributes = serde_json::to_string(data.attributes())?;
        let origin = event.origin();

        self.lock()?.execute(
            "INSERT INTO events (scan_id, timestamp_us, timestamp_role, data_type, parser_chain,
                                 source, record_offset, query, attributes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &self.scan_id,
                event.timestamp().as_micros(),
                event.timestamp_role().as_str(),
                data.data_type(),
                &origin.parser_chain,
                &origin.source,
                data.offset(),
                data.query(),
                attributes,
            ],
        )?;

        Ok(())
    }

    /// Persist one extraction warning
    pub fn insert_warning(&self, warning: &ExtractionWarning) -> Result<(), StoreError> {
        self.lock()?.execute(
            "INSERT INTO warnings (scan_id, parser_chain, source, message)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &self.scan_id,
                &warning.parser_chain,
                &warning.source,
                &warning.message,
            ],
        )?;

        Ok(())
    }

    /// Number of events stored across all scans
    pub fn count_events(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .lock()?
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Number of warnings stored across all scans
    pub fn count_warnings(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .lock()?
            .query_row("SELECT COUNT(*) FROM warnings", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// All events of one data type, in timeline order
    pub fn events_by_data_type(&self, data_type: &str) -> Result<Vec<StoredEvent>, StoreError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT timestamp_us, timestamp_role, data_type, parser_chain, source,
                    record_offset, query, attributes
             FROM events WHERE data_type = ?1
             ORDER BY timestamp_us, id",
        )?;

        let rows = stmt
            .query_map(params![data_type], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<i64>>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(micros, role, data_type, parser_chain, source, offset, query, attributes)| {
                    let timestamp = Timestamp::from_micros(micros)
                        .map_err(|e| StoreError::InvalidData(e.to_string()))?;
                    let timestamp_role = TimestampRole::parse(&role).ok_or_else(|| {
                        StoreError::InvalidData(format!("Unknown timestamp role: {}", role))
                    })?;

                    Ok(StoredEvent {
                        timestamp,
                        timestamp_role,
                        data_type,
                        parser_chain,
                        source,
                        offset,
                        query,
                        attributes: serde_json::from_str(&attributes)?,
                    })
                },
            )
            .collect()
    }
}

impl EventSink for SqliteEventStore {
    fn write_event(&self, event: &Event) -> Result<(), SinkError> {
        self.insert_event(event).map_err(SinkError::new)
    }

    fn write_warning(&self, warning: &ExtractionWarning) -> Result<(), SinkError> {
        self.insert_warning(warning).map_err(SinkError::new)
    }
}
