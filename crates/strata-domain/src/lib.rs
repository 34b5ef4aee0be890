//! Strata Domain Layer
//!
//! This crate contains the event model shared by every other Strata crate.
//! It performs no I/O and defines the value objects and trait interfaces that
//! the extraction framework and the storage layer depend upon.
//!
//! ## Key Concepts
//!
//! - **Timestamp**: An absolute, comparable point in time (microseconds since the Unix epoch)
//! - **Event**: One (timestamp, timestamp role, event data) triple
//! - **EventData**: The format-specific payload of one extracted fact
//! - **EventSink**: The boundary through which produced events leave the extraction layer
//!
//! ## Architecture
//!
//! - Pure data and conversion logic only
//! - Sink implementations live in `strata-store`
//! - Extraction logic lives in `strata-parsers`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event;
pub mod event_data;
pub mod timestamp;
pub mod traits;

// Re-exports for convenience
pub use event::{Event, EventOrigin, ExtractionWarning, TimestampRole};
pub use event_data::{
    BashHistoryCommand, BookmarkKind, EventAttributes, EventData, FirefoxBookmark,
    FirefoxBookmarkAnnotation, FirefoxBookmarkFolder, FirefoxDownload, FirefoxPageVisited,
    ZshHistoryCommand,
};
pub use timestamp::{normalize, TimeUnit, Timestamp, TimestampError};
pub use traits::{EventSink, SinkError};
