//! Bash history files written with `HISTTIMEFORMAT` set
//!
//! Each command is preceded by a comment line holding its epoch timestamp:
//!
//! ```text
//! #1609459200
//! ls -la
//! ```

use std::sync::Arc;

use regex::Regex;
use strata_domain::{BashHistoryCommand, EventAttributes, EventData, TimeUnit, TimestampRole};

use crate::error::ParseError;
use crate::mediator::ParserMediator;
use crate::text::{Record, RecordGrammar, TextPlugin};

const LOG_ENTRY: &str = "log_entry";

/// Extracts one event per timestamped bash history command
pub struct BashHistoryPlugin {
    grammar: RecordGrammar,
    verification: Regex,
}

impl BashHistoryPlugin {
    /// Plugin name
    pub const NAME: &'static str = "bash";

    /// Build the plugin's grammar
    pub fn new() -> Result<Self, ParseError> {
        let grammar = RecordGrammar::new()
            .with_structure(LOG_ENTRY, r"^#(?P<timestamp>\d{9,10})(?P<payload>\D.*)?$")?;
        // A command line followed by a timestamp comment.
        let verification = Regex::new(r"(?m)^[ \t]*[^#\s][^\n]*\n#\d{9,10}")?;
        Ok(Self {
            grammar,
            verification,
        })
    }
}

impl TextPlugin for BashHistoryPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Parser for bash history files"
    }

    fn grammar(&self) -> &RecordGrammar {
        &self.grammar
    }

    fn verify(&self, sample: &str) -> bool {
        self.verification.find_iter(sample).any(|m| {
            let rest = &sample[m.end()..];
            // The anchor must be a whole timestamp and the next line a command.
            !rest.starts_with(|c: char| c.is_ascii_digit()) && !rest.trim_start().starts_with('#')
        })
    }

    fn parse_record(&self, mediator: &mut ParserMediator, record: &Record) -> Result<(), ParseError> {
        if record.key() != LOG_ENTRY {
            return Err(ParseError::Structure(record.key().to_string()));
        }

        let timestamp = record.integer_field("timestamp")?;
        let data = EventData::new(EventAttributes::BashHistory(BashHistoryCommand {
            command: record.payload().to_string(),
        }))
        .with_offset(record.offset() as i64);

        mediator.produce_timestamp(
            Some(timestamp),
            TimeUnit::Seconds,
            TimestampRole::Modification,
            &Arc::new(data),
        )?;
        Ok(())
    }
}
