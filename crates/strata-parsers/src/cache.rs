//! Per-invocation cache of auxiliary query results

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::ParseError;

/// Key of a cached row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Integer primary key
    Integer(i64),
    /// Text key
    Text(String),
}

impl From<i64> for CacheKey {
    fn from(value: i64) -> Self {
        CacheKey::Integer(value)
    }
}

/// One materialized auxiliary result set, keyed by a chosen column
#[derive(Debug, Clone, Default)]
pub struct CachedResults {
    columns: Vec<String>,
    rows: HashMap<CacheKey, Vec<Option<String>>>,
}

impl CachedResults {
    /// Create an empty result set with the given value columns
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: HashMap::new(),
        }
    }

    /// Add or replace the row stored under `key`
    pub fn insert(&mut self, key: CacheKey, values: Vec<Option<String>>) {
        self.rows.insert(key, values);
    }

    /// All values stored under `key`
    pub fn get(&self, key: &CacheKey) -> Option<&[Option<String>]> {
        self.rows.get(key).map(Vec::as_slice)
    }

    /// A single value; `None` when the key, the column or the value is absent
    pub fn value(&self, key: &CacheKey, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(key)?.get(index)?.as_deref()
    }

    /// Number of cached rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the result set has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Named result sets built lazily, at most once per plugin invocation
///
/// A fresh cache is created for every (plugin, source) pair, so nothing
/// leaks between sources.
#[derive(Debug, Default)]
pub struct ResultCache {
    results: HashMap<String, CachedResults>,
    builds: usize,
}

impl ResultCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Previously built results, if any
    pub fn get_results(&self, name: &str) -> Option<&CachedResults> {
        self.results.get(name)
    }

    /// Return the named results, building them on first use
    ///
    /// An empty result set counts as built and is not rebuilt.
    pub fn get_or_build<F>(&mut self, name: &str, build: F) -> Result<&CachedResults, ParseError>
    where
        F: FnOnce() -> Result<CachedResults, ParseError>,
    {
        match self.results.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let results = build()?;
                self.builds += 1;
                Ok(entry.insert(results))
            }
        }
    }

    /// Number of result sets built so far
    pub fn build_count(&self) -> usize {
        self.builds
    }
}
