//! Text-format plugins: record grammars, verification, extraction

mod grammar;
mod probe;

pub use grammar::{GrammarEngine, Record, RecordGrammar};
pub use probe::ProbeSample;

use std::io::BufRead;

use crate::error::ParseError;
use crate::mediator::ParserMediator;
use crate::types::ExtractionStats;

/// A plugin that extracts events from a line-oriented text format
pub trait TextPlugin: Send + Sync {
    /// Unique plugin name
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// Record structures of the format
    fn grammar(&self) -> &RecordGrammar;

    /// Cheap check over the leading lines of a source
    ///
    /// Must not produce events and must tolerate arbitrary input.
    fn verify(&self, sample: &str) -> bool;

    /// Turn one matched record into zero or more events
    ///
    /// A record whose key the plugin does not know must yield
    /// [`ParseError::Structure`].
    fn parse_record(&self, mediator: &mut ParserMediator, record: &Record) -> Result<(), ParseError>;
}

/// Run a text plugin over every record in `reader`
pub fn extract_text<R: BufRead>(
    plugin: &dyn TextPlugin,
    reader: R,
    mediator: &mut ParserMediator,
) -> Result<ExtractionStats, ParseError> {
    GrammarEngine::new(plugin.grammar()).scan(reader, mediator, |mediator, record| {
        plugin.parse_record(mediator, record)
    })
}
