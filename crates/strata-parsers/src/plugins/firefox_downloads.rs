//! Firefox `downloads.sqlite` (Firefox 3 to 25)

use std::sync::Arc;

use strata_domain::{EventAttributes, EventData, FirefoxDownload, TimeUnit, TimestampRole};

use crate::error::ParseError;
use crate::sqlite::{QueryDefinition, QueryRow, RowContext, SqlitePlugin};

const REQUIRED_TABLES: &[&str] = &["moz_downloads"];

const DOWNLOADS_QUERY: &str = "SELECT moz_downloads.id, moz_downloads.name, \
    moz_downloads.source, moz_downloads.target, moz_downloads.tempPath, \
    moz_downloads.startTime, moz_downloads.endTime, moz_downloads.state, \
    moz_downloads.referrer, moz_downloads.currBytes, moz_downloads.maxBytes, \
    moz_downloads.mimeType FROM moz_downloads";

const QUERIES: &[QueryDefinition] = &[QueryDefinition {
    name: "download",
    sql: DOWNLOADS_QUERY,
    handler: parse_download_row,
}];

/// Extracts download start and end times
#[derive(Debug, Default)]
pub struct FirefoxDownloadsPlugin;

impl FirefoxDownloadsPlugin {
    /// Plugin name
    pub const NAME: &'static str = "firefox_downloads";

    /// Create the plugin
    pub fn new() -> Self {
        Self
    }
}

impl SqlitePlugin for FirefoxDownloadsPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Parser for Firefox downloads.sqlite databases"
    }

    fn required_tables(&self) -> &'static [&'static str] {
        REQUIRED_TABLES
    }

    fn queries(&self) -> &'static [QueryDefinition] {
        QUERIES
    }
}

fn parse_download_row(ctx: &mut RowContext<'_>, row: &QueryRow<'_>) -> Result<(), ParseError> {
    let data = Arc::new(
        EventData::new(EventAttributes::FirefoxDownload(FirefoxDownload {
            full_path: row.get_string("target"),
            mime_type: row.get_string("mimeType"),
            name: row.get_string("name"),
            received_bytes: row.get_i64("currBytes"),
            referrer: row.get_string("referrer"),
            temporary_location: row.get_string("tempPath"),
            total_bytes: row.get_i64("maxBytes"),
            url: row.get_string("source"),
        }))
        .with_offset(row.get_i64("id"))
        .with_query(ctx.query),
    );

    ctx.mediator.produce_timestamp(
        row.get_i64("startTime"),
        TimeUnit::Microseconds,
        TimestampRole::Start,
        &data,
    )?;
    ctx.mediator.produce_timestamp(
        row.get_i64("endTime"),
        TimeUnit::Microseconds,
        TimestampRole::End,
        &data,
    )?;
    Ok(())
}
