//! Line-anchored record grammars
//!
//! A grammar is a set of named structures. Each structure is a regular
//! expression that must match at the start of a line; a matching line opens a
//! new record. Lines that match no structure continue the open record, so one
//! record may span several physical lines. The named group `payload` holds
//! the remainder of the opening line; every other named group becomes a
//! record field.

use std::borrow::Cow;
use std::io::BufRead;

use regex::Regex;
use tracing::debug;

use crate::error::ParseError;
use crate::mediator::ParserMediator;
use crate::types::ExtractionStats;

const PAYLOAD_GROUP: &str = "payload";

struct LineStructure {
    key: &'static str,
    anchor: Regex,
}

/// Named record structures for one text format
pub struct RecordGrammar {
    structures: Vec<LineStructure>,
    allow_empty_payload: bool,
}

impl RecordGrammar {
    /// Create a grammar with no structures
    pub fn new() -> Self {
        Self {
            structures: Vec::new(),
            allow_empty_payload: true,
        }
    }

    /// Add a structure that opens a record when `pattern` matches at line start
    pub fn with_structure(mut self, key: &'static str, pattern: &str) -> Result<Self, ParseError> {
        let anchor = Regex::new(pattern)?;
        self.structures.push(LineStructure { key, anchor });
        Ok(self)
    }

    /// Whether records with an empty payload are handed to the plugin
    pub fn allow_empty_payload(mut self, allow: bool) -> Self {
        self.allow_empty_payload = allow;
        self
    }

    fn open_record(&self, line: &str, offset: u64) -> Option<PendingRecord> {
        self.structures.iter().find_map(|structure| {
            let captures = structure.anchor.captures(line)?;
            if captures.get(0)?.start() != 0 {
                return None;
            }

            let mut fields = Vec::new();
            let mut payload = String::new();
            for name in structure.anchor.capture_names().flatten() {
                let Some(value) = captures.name(name) else {
                    continue;
                };
                if name == PAYLOAD_GROUP {
                    payload = value.as_str().to_string();
                } else {
                    fields.push((name.to_string(), value.as_str().to_string()));
                }
            }

            Some(PendingRecord {
                key: structure.key,
                fields,
                lines: vec![payload],
                raw: line.to_string(),
                offset,
            })
        })
    }
}

impl Default for RecordGrammar {
    fn default() -> Self {
        Self::new()
    }
}

/// One logical record matched by a grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    key: &'static str,
    fields: Vec<(String, String)>,
    payload: String,
    raw: String,
    offset: u64,
}

impl Record {
    /// Key of the structure that opened this record
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// A named field captured from the opening line
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    /// A named field parsed as an integer
    pub fn integer_field(&self, name: &str) -> Result<i64, ParseError> {
        let value = self
            .field(name)
            .ok_or_else(|| ParseError::MalformedRecord(format!("missing field: {}", name)))?;
        value
            .parse()
            .map_err(|_| ParseError::MalformedRecord(format!("invalid {}: {}", name, value)))
    }

    /// Record text after the opening fields, continuation lines included
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Every physical line of the record, joined with newlines
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Byte offset of the opening line within the source
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

struct PendingRecord {
    key: &'static str,
    fields: Vec<(String, String)>,
    lines: Vec<String>,
    raw: String,
    offset: u64,
}

impl PendingRecord {
    fn push_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
        self.raw.push('\n');
        self.raw.push_str(line);
    }

    fn finish(self) -> Record {
        let payload = self.lines.join("\n");
        let payload = payload.trim_start().trim_end_matches(['\r', '\n']).to_string();
        Record {
            key: self.key,
            fields: self.fields,
            payload,
            raw: self.raw,
            offset: self.offset,
        }
    }
}

/// Drives a grammar over a line reader
pub struct GrammarEngine<'g> {
    grammar: &'g RecordGrammar,
}

impl<'g> GrammarEngine<'g> {
    /// Create an engine for `grammar`
    pub fn new(grammar: &'g RecordGrammar) -> Self {
        Self { grammar }
    }

    /// Read every record from `reader`, handing each to `on_record`
    ///
    /// Lines before the first record are reported as unparsed. Non-fatal
    /// errors from `on_record` become warnings; fatal errors end the scan.
    /// The abort flag is checked before each line.
    pub fn scan<R, F>(
        &self,
        mut reader: R,
        mediator: &mut ParserMediator,
        mut on_record: F,
    ) -> Result<ExtractionStats, ParseError>
    where
        R: BufRead,
        F: FnMut(&mut ParserMediator, &Record) -> Result<(), ParseError>,
    {
        let mut stats = ExtractionStats::default();
        let mut pending: Option<PendingRecord> = None;
        let mut buffer = Vec::new();
        let mut offset = 0u64;

        loop {
            if mediator.abort() {
                debug!("{}: abort requested at offset {}", mediator.source(), offset);
                stats.aborted = true;
                return Ok(stats);
            }

            buffer.clear();
            let read = reader.read_until(b'\n', &mut buffer)?;
            if read == 0 {
                break;
            }
            let line_offset = offset;
            offset += read as u64;

            let line = match std::str::from_utf8(&buffer) {
                Ok(line) => Cow::Borrowed(line),
                Err(_) => {
                    mediator.produce_extraction_warning(format!(
                        "invalid UTF-8 at offset {}, replaced undecodable bytes",
                        line_offset
                    ))?;
                    String::from_utf8_lossy(&buffer)
                }
            };
            let line = line.trim_end_matches(['\r', '\n']);

            if let Some(record) = self.grammar.open_record(line, line_offset) {
                if let Some(previous) = pending.replace(record) {
                    self.emit(previous.finish(), mediator, &mut on_record, &mut stats)?;
                }
            } else if let Some(open) = pending.as_mut() {
                open.push_line(line);
            } else if !line.trim().is_empty() {
                mediator.produce_unparsed_line(line)?;
                stats.unparsed_lines += 1;
            }
        }

        if let Some(last) = pending.take() {
            self.emit(last.finish(), mediator, &mut on_record, &mut stats)?;
        }

        Ok(stats)
    }

    fn emit<F>(
        &self,
        record: Record,
        mediator: &mut ParserMediator,
        on_record: &mut F,
        stats: &mut ExtractionStats,
    ) -> Result<(), ParseError>
    where
        F: FnMut(&mut ParserMediator, &Record) -> Result<(), ParseError>,
    {
        if record.payload().is_empty() && !self.grammar.allow_empty_payload {
            mediator.produce_extraction_warning(format!(
                "unable to parse record: {} at offset {}: empty payload",
                record.key(),
                record.offset()
            ))?;
            stats.skipped += 1;
            return Ok(());
        }

        stats.records += 1;
        match on_record(mediator, &record) {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                mediator.produce_extraction_warning(format!(
                    "unable to parse record: {} at offset {}: {}",
                    record.key(),
                    record.offset(),
                    e
                ))?;
                stats.skipped += 1;
                Ok(())
            }
        }
    }
}
