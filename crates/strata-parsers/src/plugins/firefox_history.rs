//! Firefox `places.sqlite`: page visits, bookmarks, annotations and folders

use std::sync::Arc;

use strata_domain::{
    BookmarkKind, EventAttributes, EventData, FirefoxBookmark, FirefoxBookmarkAnnotation,
    FirefoxBookmarkFolder, FirefoxPageVisited, TimeUnit, TimestampRole,
};

use crate::cache::CacheKey;
use crate::error::ParseError;
use crate::plugins::reverse_hostname;
use crate::sqlite::{QueryDefinition, QueryRow, RowContext, SqlitePlugin};

const REQUIRED_TABLES: &[&str] = &[
    "moz_places",
    "moz_historyvisits",
    "moz_bookmarks",
    "moz_items_annos",
];

const PAGE_VISITED_QUERY: &str = "SELECT moz_historyvisits.id, moz_places.url, \
    moz_places.title, moz_places.visit_count, moz_historyvisits.visit_date, \
    moz_historyvisits.from_visit, moz_places.rev_host, moz_places.hidden, \
    moz_places.typed, moz_historyvisits.visit_type FROM moz_places, \
    moz_historyvisits WHERE moz_places.id = moz_historyvisits.place_id";

const BOOKMARK_QUERY: &str = "SELECT moz_bookmarks.type, moz_bookmarks.title AS \
    bookmark_title, moz_bookmarks.dateAdded, moz_bookmarks.lastModified, \
    moz_places.url, moz_places.title AS places_title, moz_places.rev_host, \
    moz_places.visit_count, moz_bookmarks.id FROM moz_places, moz_bookmarks \
    WHERE moz_bookmarks.fk = moz_places.id AND moz_bookmarks.type <> 3";

const BOOKMARK_ANNOTATION_QUERY: &str = "SELECT moz_items_annos.content, \
    moz_items_annos.dateAdded, moz_items_annos.lastModified, moz_bookmarks.title, \
    moz_places.url, moz_places.rev_host, moz_items_annos.id FROM moz_items_annos, \
    moz_bookmarks, moz_places WHERE moz_items_annos.item_id = moz_bookmarks.id \
    AND moz_bookmarks.fk = moz_places.id";

const BOOKMARK_FOLDER_QUERY: &str = "SELECT moz_bookmarks.id, moz_bookmarks.title, \
    moz_bookmarks.dateAdded, moz_bookmarks.lastModified FROM moz_bookmarks WHERE \
    moz_bookmarks.type = 2";

const URL_CACHE: &str = "visit_urls";

const URL_CACHE_QUERY: &str = "SELECT h.id AS id, p.url, p.rev_host FROM moz_places p, \
    moz_historyvisits h WHERE p.id = h.place_id";

const QUERIES: &[QueryDefinition] = &[
    QueryDefinition {
        name: "page_visited",
        sql: PAGE_VISITED_QUERY,
        handler: parse_page_visited_row,
    },
    QueryDefinition {
        name: "bookmark",
        sql: BOOKMARK_QUERY,
        handler: parse_bookmark_row,
    },
    QueryDefinition {
        name: "bookmark_annotation",
        sql: BOOKMARK_ANNOTATION_QUERY,
        handler: parse_bookmark_annotation_row,
    },
    QueryDefinition {
        name: "bookmark_folder",
        sql: BOOKMARK_FOLDER_QUERY,
        handler: parse_bookmark_folder_row,
    },
];

/// Extracts browsing history and bookmarks from Firefox 3+ places databases
#[derive(Debug, Default)]
pub struct FirefoxHistoryPlugin;

impl FirefoxHistoryPlugin {
    /// Plugin name
    pub const NAME: &'static str = "firefox_history";

    /// Create the plugin
    pub fn new() -> Self {
        Self
    }
}

impl SqlitePlugin for FirefoxHistoryPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Parser for Firefox history and bookmark places.sqlite databases"
    }

    fn required_tables(&self) -> &'static [&'static str] {
        REQUIRED_TABLES
    }

    fn queries(&self) -> &'static [QueryDefinition] {
        QUERIES
    }
}

fn parse_page_visited_row(ctx: &mut RowContext<'_>, row: &QueryRow<'_>) -> Result<(), ParseError> {
    let mut extra = Vec::new();

    if let Some(from_visit) = row.get_i64("from_visit").filter(|id| *id != 0) {
        extra.push(format!("visited from: {}", visit_url(ctx, from_visit)?));
    }
    if row.get_flag("hidden") {
        extra.push("(url hidden)".to_string());
    }
    if row.get_flag("typed") {
        extra.push("(directly typed)".to_string());
    } else {
        extra.push("(URL not typed directly)".to_string());
    }

    let data = EventData::new(EventAttributes::FirefoxPageVisited(FirefoxPageVisited {
        host: reverse_hostname(row.get_string("rev_host").as_deref()),
        title: row.get_string("title"),
        url: row.get_string("url"),
        visit_count: row.get_i64("visit_count"),
        visit_type: row.get_i64("visit_type"),
        extra,
    }))
    .with_offset(row.get_i64("id"))
    .with_query(ctx.query);

    ctx.mediator.produce_timestamp(
        row.get_i64("visit_date"),
        TimeUnit::Microseconds,
        TimestampRole::LastVisited,
        &Arc::new(data),
    )?;
    Ok(())
}

/// `url (host)` of a visit, or an empty string when the visit is unknown
fn visit_url(ctx: &mut RowContext<'_>, visit_id: i64) -> Result<String, ParseError> {
    let database = ctx.database;
    let urls = ctx.cache.get_or_build(URL_CACHE, || {
        database.cache_query_results(URL_CACHE_QUERY, "id", &["url", "rev_host"])
    })?;

    let key = CacheKey::Integer(visit_id);
    let url = urls.value(&key, "url").unwrap_or_default();
    if url.is_empty() {
        return Ok(String::new());
    }
    let host = reverse_hostname(urls.value(&key, "rev_host"));
    Ok(format!("{} ({})", url, host))
}

fn parse_bookmark_row(ctx: &mut RowContext<'_>, row: &QueryRow<'_>) -> Result<(), ParseError> {
    let host = reverse_hostname(row.get_string("rev_host").as_deref());
    let data = EventData::new(EventAttributes::FirefoxBookmark(FirefoxBookmark {
        host: if host.is_empty() { "N/A".to_string() } else { host },
        places_title: row.get_string("places_title"),
        title: row.get_string("bookmark_title"),
        kind: BookmarkKind::from_code(row.get_i64("type")),
        url: row.get_string("url"),
        visit_count: row.get_i64("visit_count"),
    }))
    .with_offset(row.get_i64("id"))
    .with_query(ctx.query);

    produce_added_and_modified(ctx, row, data)
}

fn parse_bookmark_annotation_row(
    ctx: &mut RowContext<'_>,
    row: &QueryRow<'_>,
) -> Result<(), ParseError> {
    let data = EventData::new(EventAttributes::FirefoxBookmarkAnnotation(
        FirefoxBookmarkAnnotation {
            content: row.get_string("content"),
            title: row.get_string("title"),
            url: row.get_string("url"),
        },
    ))
    .with_offset(row.get_i64("id"))
    .with_query(ctx.query);

    produce_added_and_modified(ctx, row, data)
}

fn parse_bookmark_folder_row(
    ctx: &mut RowContext<'_>,
    row: &QueryRow<'_>,
) -> Result<(), ParseError> {
    let title = row
        .get_string("title")
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| "N/A".to_string());
    let data = EventData::new(EventAttributes::FirefoxBookmarkFolder(FirefoxBookmarkFolder {
        title,
    }))
    .with_offset(row.get_i64("id"))
    .with_query(ctx.query);

    produce_added_and_modified(ctx, row, data)
}

fn produce_added_and_modified(
    ctx: &mut RowContext<'_>,
    row: &QueryRow<'_>,
    data: EventData,
) -> Result<(), ParseError> {
    let data = Arc::new(data);
    ctx.mediator.produce_timestamp(
        row.get_i64("dateAdded"),
        TimeUnit::Microseconds,
        TimestampRole::Added,
        &data,
    )?;
    ctx.mediator.produce_timestamp(
        row.get_i64("lastModified"),
        TimeUnit::Microseconds,
        TimestampRole::Modification,
        &data,
    )?;
    Ok(())
}
