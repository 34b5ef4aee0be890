//! Zsh extended history files (`setopt EXTENDED_HISTORY`)
//!
//! Each entry reads `: <start>:<elapsed>;<command>`, with multi-line commands
//! continued on the following lines.

use std::sync::Arc;

use regex::Regex;
use strata_domain::{EventAttributes, EventData, TimeUnit, TimestampRole, ZshHistoryCommand};

use crate::error::ParseError;
use crate::mediator::ParserMediator;
use crate::text::{Record, RecordGrammar, TextPlugin};

const COMMAND: &str = "command";

/// Extracts one event per zsh extended history entry
pub struct ZshHistoryPlugin {
    grammar: RecordGrammar,
    verification: Regex,
}

impl ZshHistoryPlugin {
    /// Plugin name
    pub const NAME: &'static str = "zsh_extended_history";

    /// Build the plugin's grammar
    pub fn new() -> Result<Self, ParseError> {
        let grammar = RecordGrammar::new()
            .with_structure(
                COMMAND,
                r"^:\s(?P<timestamp>\d+):(?P<elapsed_seconds>\d+);(?P<payload>.*)$",
            )?
            .allow_empty_payload(false);
        let verification = Regex::new(r"^:\s\d+:\d+;")?;
        Ok(Self {
            grammar,
            verification,
        })
    }
}

impl TextPlugin for ZshHistoryPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Parser for ZSH extended history files"
    }

    fn grammar(&self) -> &RecordGrammar {
        &self.grammar
    }

    fn verify(&self, sample: &str) -> bool {
        self.verification.is_match(sample)
    }

    fn parse_record(&self, mediator: &mut ParserMediator, record: &Record) -> Result<(), ParseError> {
        if record.key() != COMMAND {
            return Err(ParseError::Structure(record.key().to_string()));
        }

        let timestamp = record.integer_field("timestamp")?;
        let elapsed_seconds = record.integer_field("elapsed_seconds")?;
        let data = EventData::new(EventAttributes::ZshHistory(ZshHistoryCommand {
            command: record.payload().to_string(),
            elapsed_seconds,
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
