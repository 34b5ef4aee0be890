//! Read-only access to a relational source

use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};

use crate::cache::{CacheKey, CachedResults};
use crate::error::ParseError;

/// First 16 bytes of every SQLite database file
pub const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// An open relational source
pub struct SqliteDatabase {
    conn: Connection,
    name: String,
}

impl SqliteDatabase {
    /// Open a database file read-only
    pub fn open(path: &Path) -> Result<Self, ParseError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self {
            conn,
            name: path.display().to_string(),
        })
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection, name: impl Into<String>) -> Self {
        Self {
            conn,
            name: name.into(),
        }
    }

    /// Display name of the source
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of all tables in the database
    pub fn table_names(&self) -> Result<BTreeSet<String>, ParseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(names)
    }

    /// Required tables absent from the database, in the order given
    pub fn missing_tables(&self, required: &[&str]) -> Result<Vec<String>, ParseError> {
        let tables = self.table_names()?;
        Ok(required
            .iter()
            .filter(|table| !tables.contains(**table))
            .map(|table| table.to_string())
            .collect())
    }

    /// Run `sql` and hand each materialized row to `on_row`
    ///
    /// `on_row` returns `false` to stop iterating. A statement that fails to
    /// prepare is reported as [`ParseError::Query`].
    pub fn for_each_row<F>(&self, sql: &str, mut on_row: F) -> Result<(), ParseError>
    where
        F: FnMut(&QueryRow<'_>) -> Result<bool, ParseError>,
    {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| ParseError::Query(e.to_string()))?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let values = (0..columns.len())
                .map(|i| row.get::<_, Value>(i))
                .collect::<Result<Vec<_>, _>>()?;
            if !on_row(&QueryRow::new(&columns, values))? {
                break;
            }
        }
        Ok(())
    }

    /// Materialize an auxiliary query keyed by `key_column`
    pub fn cache_query_results(
        &self,
        sql: &str,
        key_column: &str,
        value_columns: &[&str],
    ) -> Result<CachedResults, ParseError> {
        let mut results = CachedResults::new(value_columns);
        self.for_each_row(sql, |row| {
            if let Some(key) = row.get_key(key_column) {
                let values = value_columns
                    .iter()
                    .map(|column| row.get_string(column))
                    .collect();
                results.insert(key, values);
            }
            Ok(true)
        })?;
        Ok(results)
    }
}

/// Read-only, named view of one result row
///
/// Accessors are lenient: a missing column or a NULL value reads as `None`,
/// and values are converted between SQLite storage classes where sensible.
#[derive(Debug, Clone)]
pub struct QueryRow<'c> {
    columns: &'c [String],
    values: Vec<Value>,
}

impl<'c> QueryRow<'c> {
    /// Create a row from column names and values in the same order
    pub fn new(columns: &'c [String], values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    fn value(&self, name: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == name)?;
        self.values.get(index)
    }

    /// Column value as an integer
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.value(name)? {
            Value::Integer(i) => Some(*i),
            Value::Real(f) => Some(*f as i64),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Null | Value::Blob(_) => None,
        }
    }

    /// Column value as text
    pub fn get_string(&self, name: &str) -> Option<String> {
        match self.value(name)? {
            Value::Text(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Real(f) => Some(f.to_string()),
            Value::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
            Value::Null => None,
        }
    }

    /// Column value as a flag: true for integer 1 or text "1"
    pub fn get_flag(&self, name: &str) -> bool {
        match self.value(name) {
            Some(Value::Integer(i)) => *i == 1,
            Some(Value::Text(s)) => s == "1",
            _ => false,
        }
    }

    fn get_key(&self, name: &str) -> Option<CacheKey> {
        match self.value(name)? {
            Value::Integer(i) => Some(CacheKey::Integer(*i)),
            Value::Text(s) => Some(CacheKey::Text(s.clone())),
            _ => None,
        }
    }
}
