//! In-memory event sink

use std::sync::Mutex;
use strata_domain::{Event, EventSink, ExtractionWarning, SinkError};

/// Collects events and warnings in memory
///
/// Emission order is preserved per writer; writers on different threads
/// interleave in lock order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
    warnings: Mutex<Vec<ExtractionWarning>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events received so far
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Snapshot of all warnings received so far
    pub fn warnings(&self) -> Vec<ExtractionWarning> {
        self.warnings
            .lock()
            .map(|warnings| warnings.clone())
            .unwrap_or_default()
    }

    /// Number of events received so far
    pub fn event_count(&self) -> usize {
        self.events.lock().map(|events| events.len()).unwrap_or(0)
    }
}

impl EventSink for MemorySink {
    fn write_event(&self, event: &Event) -> Result<(), SinkError> {
        self.events
            .lock()
            .map_err(SinkError::new)?
            .push(event.clone());
        Ok(())
    }

    fn write_warning(&self, warning: &ExtractionWarning) -> Result<(), SinkError> {
        self.warnings
            .lock()
            .map_err(SinkError::new)?
            .push(warning.clone());
        Ok(())
    }
}
