//! Cheap verification sampling for text sources

use std::io::BufRead;

use tracing::debug;

use crate::config::ScanConfig;
use crate::error::ParseError;
use crate::text::TextPlugin;

/// Leading lines of a source, decoded for verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSample {
    lines: Vec<String>,
}

impl ProbeSample {
    /// Read up to `max_lines` lines from `reader`
    ///
    /// Returns `None` when the sample contains a NUL byte or invalid UTF-8,
    /// i.e. when the source is not text. Lines longer than `max_line_length`
    /// bytes are truncated at a character boundary.
    pub fn read<R: BufRead>(
        mut reader: R,
        max_lines: usize,
        max_line_length: usize,
    ) -> Result<Option<Self>, ParseError> {
        let mut lines = Vec::new();
        let mut buffer = Vec::new();

        while lines.len() < max_lines {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            if buffer.contains(&0) {
                debug!("probe: NUL byte in line {}", lines.len() + 1);
                return Ok(None);
            }
            let Ok(line) = std::str::from_utf8(&buffer) else {
                debug!("probe: invalid UTF-8 in line {}", lines.len() + 1);
                return Ok(None);
            };
            let line = line.trim_end_matches(['\r', '\n']);
            lines.push(truncate_at_boundary(line, max_line_length).to_string());
        }

        Ok(Some(Self { lines }))
    }

    /// Number of lines in the sample
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the source was empty
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The first `count` lines joined with newlines
    pub fn head(&self, count: usize) -> String {
        let end = count.min(self.lines.len());
        self.lines[..end].join("\n")
    }

    /// Run a plugin's verification over a widening window
    ///
    /// Attempt `n` verifies the first `n * probe_line_count` lines. Stops
    /// early once the window covers the whole sample.
    pub fn verify_with(&self, plugin: &dyn TextPlugin, config: &ScanConfig) -> bool {
        if self.is_empty() {
            return false;
        }
        for attempt in 1..=config.max_probe_attempts {
            let window = config.probe_line_count.saturating_mul(attempt);
            if plugin.verify(&self.head(window)) {
                debug!("probe: {} accepted after {} attempt(s)", plugin.name(), attempt);
                return true;
            }
            if window >= self.lines.len() {
                break;
            }
        }
        false
    }
}

fn truncate_at_boundary(line: &str, max_len: usize) -> &str {
    if line.len() <= max_len {
        return line;
    }
    let mut end = max_len;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    &line[..end]
}
