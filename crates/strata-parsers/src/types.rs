//! Outcome and reporting types for a scan

use serde::{Deserialize, Serialize};

/// Counters reported by one plugin invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Records (text) or rows (relational) handed to the plugin
    pub records: usize,

    /// Records or rows skipped with a warning
    pub skipped: usize,

    /// Lines that matched no record structure
    pub unparsed_lines: usize,

    /// Declared queries that could not run against the source
    pub failed_queries: usize,

    /// Auxiliary result sets built during the invocation
    pub cache_builds: usize,

    /// Whether the invocation stopped early on a cancel request
    pub aborted: bool,
}

/// Lifecycle of one (plugin, source) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Source has not been probed yet
    Unprobed,
    /// Plugin accepted the source
    Selected,
    /// Records or rows are being read
    Extracting,
    /// Extraction finished, possibly with per-record warnings
    Done,
    /// Plugin did not run, or stopped on a fatal error
    Skipped,
}

/// Terminal outcome of one (plugin, source) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PluginOutcome {
    /// Extraction ran to completion (or to a cancel request)
    Done {
        /// Events delivered to the sink
        events: usize,
        /// Warnings delivered to the sink
        warnings: usize,
        /// Invocation counters
        stats: ExtractionStats,
    },

    /// Plugin stopped on a fatal error
    ///
    /// Events and warnings delivered before the error stay in the sink and
    /// are counted here.
    Skipped {
        /// Human-readable cause
        reason: String,
        /// Events delivered before the error
        events: usize,
        /// Warnings delivered before the error
        warnings: usize,
    },
}

impl PluginOutcome {
    /// Final lifecycle state of this outcome
    pub fn state(&self) -> ScanState {
        match self {
            PluginOutcome::Done { .. } => ScanState::Done,
            PluginOutcome::Skipped { .. } => ScanState::Skipped,
        }
    }

    /// Events delivered to the sink, including those before a fatal error
    pub fn events(&self) -> usize {
        match self {
            PluginOutcome::Done { events, .. } | PluginOutcome::Skipped { events, .. } => *events,
        }
    }
}

/// Result of one plugin on one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRun {
    /// Parser chain, e.g. `text/bash`
    pub parser_chain: String,

    /// What happened
    pub outcome: PluginOutcome,
}

/// Per-source summary produced by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReport {
    /// Display name of the source
    pub source: String,

    /// One entry per plugin that accepted the source
    pub runs: Vec<PluginRun>,
}

impl SourceReport {
    /// Total events delivered for this source
    pub fn total_events(&self) -> usize {
        self.runs.iter().map(|run| run.outcome.events()).sum()
    }

    /// Whether no plugin accepted the source
    pub fn is_unclaimed(&self) -> bool {
        self.runs.is_empty()
    }
}
