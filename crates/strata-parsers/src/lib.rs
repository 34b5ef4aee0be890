//! Strata Parsers
//!
//! Turns forensic artifacts into timeline events.
//!
//! # Overview
//!
//! A source (a history file, a browser database) is handed to the
//! [`Dispatcher`], which selects every registered plugin able to read it and
//! runs each one in isolation. Plugins come in two families:
//!
//! - **Text plugins** describe their format as a [`RecordGrammar`] of
//!   line-anchored structures and turn each matched [`Record`] into events.
//! - **Relational plugins** declare required tables and a fixed list of
//!   [`QueryDefinition`]s, each paired with a row handler.
//!
//! Events leave through a [`ParserMediator`] into an [`EventSink`].
//!
//! # Architecture
//!
//! ```text
//! Source → Dispatcher → Plugin (text | sqlite) → ParserMediator → EventSink
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use strata_parsers::{AbortHandle, Dispatcher, PluginRegistry, ScanConfig, Source};
//! use strata_store::SqliteEventStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(PluginRegistry::with_default_plugins()?);
//! let dispatcher = Dispatcher::new(registry, ScanConfig::default())?;
//! let store = Arc::new(SqliteEventStore::new("timeline.db")?);
//!
//! let report = dispatcher.scan(
//!     &Source::file("/home/alice/.bash_history"),
//!     store,
//!     &AbortHandle::new(),
//! )?;
//!
//! println!("{}: {} events", report.source, report.total_events());
//! # Ok(())
//! # }
//! ```
//!
//! [`EventSink`]: strata_domain::EventSink

#![warn(missing_docs)]

mod cache;
mod config;
mod dispatcher;
mod error;
mod mediator;
mod registry;
mod source;
mod types;

pub mod plugins;
pub mod sqlite;
pub mod text;


pub use cache::{CacheKey, CachedResults, ResultCache};
pub use config::ScanConfig;
pub use dispatcher::Dispatcher;
pub use error::ParseError;
pub use mediator::{AbortHandle, ParserMediator};
pub use registry::{
    Capability, CapabilityDescriptor, Plugin, PluginKind, PluginRegistry, RegistryError,
};
pub use source::Source;
pub use sqlite::{QueryDefinition, QueryRow, RowContext, SqliteDatabase, SqlitePlugin};
pub use text::{Record, RecordGrammar, TextPlugin};
pub use types::{ExtractionStats, PluginOutcome, PluginRun, ScanState, SourceReport};
