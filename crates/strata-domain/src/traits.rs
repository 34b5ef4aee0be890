//! Trait definitions for external interactions
//!
//! These traits define the boundaries between extraction logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::event::{Event, ExtractionWarning};
use thiserror::Error;

/// Error reported by an [`EventSink`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Sink error: {0}")]
pub struct SinkError(pub String);

impl SinkError {
    /// Create a sink error from any displayable cause
    pub fn new(cause: impl std::fmt::Display) -> Self {
        Self(cause.to_string())
    }
}

/// Trait for persisting produced events
///
/// Implemented by the infrastructure layer (strata-store). Several extraction
/// invocations may write to the same sink from different threads, so
/// implementations serialize or otherwise tolerate concurrent calls.
pub trait EventSink: Send + Sync {
    /// Persist one event
    fn write_event(&self, event: &Event) -> Result<(), SinkError>;

    /// Persist one extraction warning
    fn write_warning(&self, warning: &ExtractionWarning) -> Result<(), SinkError>;
}
