//! The mediator sits between one plugin invocation and the event sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use strata_domain::{
    normalize, Event, EventData, EventOrigin, EventSink, ExtractionWarning, TimeUnit, Timestamp,
    TimestampRole,
};
use tracing::debug;

use crate::error::ParseError;

/// Longest line echoed back in an "unable to parse" warning
const MAX_ECHOED_LINE: usize = 80;

/// Shared cancel flag checked between records and rows
#[derive(Debug, Clone, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    /// Create a handle in the running state
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Hands events and warnings from a plugin to the sink
///
/// One mediator exists per (plugin, source) pair. It stamps every event with
/// the parser chain and source name, and counts what passed through it.
pub struct ParserMediator {
    sink: Arc<dyn EventSink>,
    origin: EventOrigin,
    abort: AbortHandle,
    events_produced: usize,
    warnings_produced: usize,
}

impl ParserMediator {
    /// Create a mediator for one plugin invocation
    pub fn new(
        sink: Arc<dyn EventSink>,
        parser_chain: impl Into<String>,
        source: impl Into<String>,
        abort: AbortHandle,
    ) -> Self {
        Self {
            sink,
            origin: EventOrigin {
                parser_chain: parser_chain.into(),
                source: source.into(),
            },
            abort,
            events_produced: 0,
            warnings_produced: 0,
        }
    }

    /// Parser chain stamped on produced events
    pub fn parser_chain(&self) -> &str {
        &self.origin.parser_chain
    }

    /// Source name stamped on produced events
    pub fn source(&self) -> &str {
        &self.origin.source
    }

    /// Whether the scan has been asked to stop
    pub fn abort(&self) -> bool {
        self.abort.is_aborted()
    }

    /// Deliver one event to the sink
    pub fn produce(
        &mut self,
        timestamp: Timestamp,
        role: TimestampRole,
        data: &Arc<EventData>,
    ) -> Result<(), ParseError> {
        let event = Event::new(timestamp, role, Arc::clone(data), self.origin.clone());
        self.sink.write_event(&event)?;
        self.events_produced += 1;
        Ok(())
    }

    /// Normalize a raw timestamp column and deliver an event if it is present
    ///
    /// Absent values (NULL or zero) produce nothing. Out-of-range values
    /// produce an extraction warning instead of an event. Returns whether an
    /// event was delivered.
    pub fn produce_timestamp(
        &mut self,
        raw: Option<i64>,
        unit: TimeUnit,
        role: TimestampRole,
        data: &Arc<EventData>,
    ) -> Result<bool, ParseError> {
        match normalize(raw, unit) {
            Ok(Some(timestamp)) => {
                self.produce(timestamp, role, data)?;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                debug!("{}: skipping {}: {}", self.origin.source, role.as_str(), e);
                self.produce_extraction_warning(format!(
                    "unable to normalize {}: {}",
                    role.description(),
                    e
                ))?;
                Ok(false)
            }
        }
    }

    /// Deliver a non-fatal extraction warning to the sink
    pub fn produce_extraction_warning(&mut self, message: impl Into<String>) -> Result<(), ParseError> {
        let warning = ExtractionWarning {
            parser_chain: self.origin.parser_chain.clone(),
            source: self.origin.source.clone(),
            message: message.into(),
        };
        self.sink.write_warning(&warning)?;
        self.warnings_produced += 1;
        Ok(())
    }

    /// Warn about a line that matched no known structure
    pub fn produce_unparsed_line(&mut self, line: &str) -> Result<(), ParseError> {
        self.produce_extraction_warning(format!(
            "unable to parse log line: {}",
            truncate_line(line)
        ))
    }

    /// Events delivered so far
    pub fn events_produced(&self) -> usize {
        self.events_produced
    }

    /// Warnings delivered so far
    pub fn warnings_produced(&self) -> usize {
        self.warnings_produced
    }
}

fn truncate_line(line: &str) -> String {
    if line.chars().count() <= MAX_ECHOED_LINE {
        return line.to_string();
    }
    let kept: String = line.chars().take(MAX_ECHOED_LINE - 3).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_domain::{BashHistoryCommand, EventAttributes};
    use strata_store::MemorySink;

    fn bash_data(command: &str) -> Arc<EventData> {
        Arc::new(EventData::new(EventAttributes::BashHistory(
            BashHistoryCommand {
                command: command.to_string(),
            },
        )))
    }

    fn mediator(sink: &Arc<MemorySink>) -> ParserMediator {
        ParserMediator::new(
            Arc::clone(sink) as Arc<dyn EventSink>,
            "text/bash",
            "fixture",
            AbortHandle::new(),
        )
    }

    #[test]
    fn test_produce_stamps_origin() {
        let sink = Arc::new(MemorySink::new());
        let mut mediator = mediator(&sink);

        let ts = Timestamp::from_micros(1_000_000).unwrap();
        mediator
            .produce(ts, TimestampRole::Modification, &bash_data("ls"))
            .unwrap();

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].origin().parser_chain, "text/bash");
        assert_eq!(events[0].origin().source, "fixture");
        assert_eq!(mediator.events_produced(), 1);
    }

    #[test]
    fn test_zero_timestamp_is_absent() {
        let sink = Arc::new(MemorySink::new());
        let mut mediator = mediator(&sink);
        let data = bash_data("ls");

        let produced = mediator
            .produce_timestamp(Some(0), TimeUnit::Seconds, TimestampRole::Modification, &data)
            .unwrap();
        assert!(!produced);

        let produced = mediator
            .produce_timestamp(None, TimeUnit::Seconds, TimestampRole::Modification, &data)
            .unwrap();
        assert!(!produced);

        assert_eq!(sink.event_count(), 0);
        assert!(sink.warnings().is_empty());
    }

    #[test]
    fn test_out_of_range_timestamp_warns() {
        let sink = Arc::new(MemorySink::new());
        let mut mediator = mediator(&sink);

        let produced = mediator
            .produce_timestamp(
                Some(i64::MAX),
                TimeUnit::Seconds,
                TimestampRole::Modification,
                &bash_data("ls"),
            )
            .unwrap();

        assert!(!produced);
        assert_eq!(sink.event_count(), 0);
        assert_eq!(sink.warnings().len(), 1);
        assert_eq!(mediator.warnings_produced(), 1);
    }

    #[test]
    fn test_shared_data_across_events() {
        let sink = Arc::new(MemorySink::new());
        let mut mediator = mediator(&sink);
        let data = bash_data("ls");

        mediator
            .produce_timestamp(Some(10), TimeUnit::Seconds, TimestampRole::Added, &data)
            .unwrap();
        mediator
            .produce_timestamp(Some(20), TimeUnit::Seconds, TimestampRole::Modification, &data)
            .unwrap();

        let events = sink.events();
        assert!(Arc::ptr_eq(events[0].shared_data(), events[1].shared_data()));
    }

    #[test]
    fn test_unparsed_line_is_truncated() {
        let sink = Arc::new(MemorySink::new());
        let mut mediator = mediator(&sink);

        mediator.produce_unparsed_line(&"x".repeat(200)).unwrap();

        let warnings = sink.warnings();
        let message = &warnings[0].message;
        assert!(message.starts_with("unable to parse log line: "));
        assert!(message.ends_with("..."));
        assert_eq!(message.len(), "unable to parse log line: ".len() + 80);
    }

    #[test]
    fn test_abort_handle_is_shared() {
        let handle = AbortHandle::new();
        let sink = Arc::new(MemorySink::new());
        let mediator = ParserMediator::new(
            sink as Arc<dyn EventSink>,
            "text/bash",
            "fixture",
            handle.clone(),
        );

        assert!(!mediator.abort());
        handle.abort();
        assert!(mediator.abort());
    }
}
