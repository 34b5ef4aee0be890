//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::scanner::SourceResult;
use colored::*;
use strata_parsers::{Capability, CapabilityDescriptor, PluginOutcome};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

/// One line of a scan summary.
struct SummaryRow {
    source: String,
    plugin: String,
    status: Status,
    events: usize,
    warnings: usize,
}

enum Status {
    Done,
    Aborted,
    Skipped(String),
    Unclaimed,
    Failed(String),
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format the results of a scan.
    pub fn format_scan(&self, results: &[SourceResult]) -> Result<String> {
        let total: usize = results.iter().map(SourceResult::total_events).sum();
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "sources": results,
                "total_events": total,
            }))?),
            OutputFormat::Table => Ok(self.format_scan_table(results, total)),
            OutputFormat::Quiet => Ok(self.format_scan_lines(results, total)),
        }
    }

    fn format_scan_table(&self, results: &[SourceResult], total: usize) -> String {
        let rows = summary_rows(results);
        if rows.is_empty() {
            return self.colorize("No sources scanned.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["Source", "Plugin", "Status", "Events", "Warnings"]);
        for row in &rows {
            builder.push_record([
                row.source.clone(),
                row.plugin.clone(),
                self.status_label(&row.status),
                row.events.to_string(),
                row.warnings.to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        format!("{}\n{}", table, self.total_line(results.len(), total))
    }

    fn format_scan_lines(&self, results: &[SourceResult], total: usize) -> String {
        let mut lines: Vec<String> = summary_rows(results)
            .iter()
            .map(|row| match &row.status {
                Status::Done => format!("{}: {} done ({} events)", row.source, row.plugin, row.events),
                Status::Aborted => {
                    format!("{}: {} aborted ({} events)", row.source, row.plugin, row.events)
                }
                Status::Skipped(reason) => {
                    format!("{}: {} skipped ({})", row.source, row.plugin, reason)
                }
                Status::Unclaimed => format!("{}: no matching plugin", row.source),
                Status::Failed(error) => format!("{}: error ({})", row.source, error),
            })
            .collect();
        lines.push(self.total_line(results.len(), total));
        lines.join("\n")
    }

    fn total_line(&self, sources: usize, events: usize) -> String {
        format!("Total: {} events from {} source(s)", events, sources)
    }

    fn status_label(&self, status: &Status) -> String {
        match status {
            Status::Done => self.colorize("done", "green"),
            Status::Aborted => self.colorize("aborted", "yellow"),
            Status::Skipped(reason) => self.colorize(&format!("skipped: {}", reason), "yellow"),
            Status::Unclaimed => "no matching plugin".to_string(),
            Status::Failed(error) => self.colorize(&format!("error: {}", error), "red"),
        }
    }

    /// Format the plugin list.
    pub fn format_plugins(&self, plugins: &[CapabilityDescriptor]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let json: Vec<serde_json::Value> = plugins
                    .iter()
                    .map(|p| {
                        serde_json::json!({
                            "name": p.name,
                            "kind": p.kind.as_str(),
                            "description": p.description,
                            "required_tables": required_tables(p),
                        })
                    })
                    .collect();
                Ok(serde_json::to_string_pretty(&json)?)
            }
            OutputFormat::Table => {
                let mut builder = Builder::default();
                builder.push_record(["Name", "Kind", "Requires", "Description"]);
                for plugin in plugins {
                    builder.push_record([
                        plugin.name.to_string(),
                        plugin.kind.as_str().to_string(),
                        requirement(plugin),
                        plugin.description.to_string(),
                    ]);
                }
                let mut table = builder.build();
                table
                    .with(Style::rounded())
                    .with(Modify::new(Rows::first()).with(Alignment::center()));
                Ok(table.to_string())
            }
            OutputFormat::Quiet => Ok(plugins
                .iter()
                .map(|p| p.name)
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn summary_rows(results: &[SourceResult]) -> Vec<SummaryRow> {
    let mut rows = Vec::new();
    for result in results {
        match result {
            SourceResult::Failed { source, error } => rows.push(SummaryRow {
                source: source.clone(),
                plugin: "-".to_string(),
                status: Status::Failed(error.clone()),
                events: 0,
                warnings: 0,
            }),
            SourceResult::Scanned(report) if report.is_unclaimed() => rows.push(SummaryRow {
                source: report.source.clone(),
                plugin: "-".to_string(),
                status: Status::Unclaimed,
                events: 0,
                warnings: 0,
            }),
            SourceResult::Scanned(report) => {
                for run in &report.runs {
                    let (status, events, warnings) = match &run.outcome {
                        PluginOutcome::Done {
                            events,
                            warnings,
                            stats,
                        } => {
                            let status = if stats.aborted {
                                Status::Aborted
                            } else {
                                Status::Done
                            };
                            (status, *events, *warnings)
                        }
                        PluginOutcome::Skipped {
                            reason,
                            events,
                            warnings,
                        } => (Status::Skipped(reason.clone()), *events, *warnings),
                    };
                    rows.push(SummaryRow {
                        source: report.source.clone(),
                        plugin: run.parser_chain.clone(),
                        status,
                        events,
                        warnings,
                    });
                }
            }
        }
    }
    rows
}

fn required_tables(plugin: &CapabilityDescriptor) -> Vec<&'static str> {
    match &plugin.capability {
        Capability::RequiredTables(tables) => tables.clone(),
        Capability::Verify => Vec::new(),
    }
}

fn requirement(plugin: &CapabilityDescriptor) -> String {
    match &plugin.capability {
        Capability::RequiredTables(tables) => tables.join(", "),
        Capability::Verify => "format verification".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_parsers::{ExtractionStats, PluginRegistry, PluginRun, SourceReport};

    fn results() -> Vec<SourceResult> {
        vec![
            SourceResult::Scanned(SourceReport {
                source: "/home/alice/.bash_history".to_string(),
                runs: vec![PluginRun {
                    parser_chain: "text/bash".to_string(),
                    outcome: PluginOutcome::Done {
                        events: 2,
                        warnings: 0,
                        stats: ExtractionStats::default(),
                    },
                }],
            }),
            SourceResult::Scanned(SourceReport {
                source: "places.sqlite".to_string(),
                runs: vec![PluginRun {
                    parser_chain: "sqlite/firefox_history".to_string(),
                    outcome: PluginOutcome::Skipped {
                        reason: "Database error: disk I/O error".to_string(),
                        events: 3,
                        warnings: 0,
                    },
                }],
            }),
            SourceResult::Scanned(SourceReport {
                source: "notes.txt".to_string(),
                runs: Vec::new(),
            }),
            SourceResult::Failed {
                source: "missing".to_string(),
                error: "I/O error".to_string(),
            },
        ]
    }

    #[test]
    fn test_quiet_lines() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_scan(&results()).unwrap();

        let lines: Vec<_> = output.lines().collect();
        assert_eq!(
            lines,
            vec![
                "/home/alice/.bash_history: text/bash done (2 events)",
                "places.sqlite: sqlite/firefox_history skipped (Database error: disk I/O error)",
                "notes.txt: no matching plugin",
                "missing: error (I/O error)",
                "Total: 5 events from 4 source(s)",
            ]
        );
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_scan(&results()).unwrap();

        assert!(output.contains("Source"));
        assert!(output.contains("text/bash"));
        assert!(output.contains("no matching plugin"));
        assert!(output.ends_with("Total: 5 events from 4 source(s)"));
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_scan(&results()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["total_events"], 5);
        assert_eq!(value["sources"][0]["status"], "scanned");
        assert_eq!(value["sources"][3]["status"], "failed");
    }

    #[test]
    fn test_empty_scan() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_scan(&[]).unwrap();
        assert!(output.contains("No sources scanned"));
    }

    #[test]
    fn test_plugin_list() {
        let registry = PluginRegistry::with_default_plugins().unwrap();
        let descriptors = registry.descriptors();

        let quiet = Formatter::new(OutputFormat::Quiet, false)
            .format_plugins(&descriptors)
            .unwrap();
        assert_eq!(
            quiet,
            "bash\nzsh_extended_history\nfirefox_history\nfirefox_downloads"
        );

        let table = Formatter::new(OutputFormat::Table, false)
            .format_plugins(&descriptors)
            .unwrap();
        assert!(table.contains("moz_downloads"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.warning("test"), "⚠ test");
    }
}
