//! Event data - the format-specific payload of one extracted fact
//!
//! Each artifact format has its own closed attribute record. The variant of
//! [`EventAttributes`] is chosen at construction and selects the `data_type`
//! string used by downstream formatting and filtering.

use serde::{Deserialize, Serialize};

/// Format-specific payload shared by all events produced from one record or row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventData {
    offset: Option<i64>,
    query: Option<String>,
    attributes: EventAttributes,
}

impl EventData {
    /// Create event data for the given attribute record
    pub fn new(attributes: EventAttributes) -> Self {
        Self {
            offset: None,
            query: None,
            attributes,
        }
    }

    /// Set the source-relative locator (row id or byte offset)
    pub fn with_offset(mut self, offset: impl Into<Option<i64>>) -> Self {
        self.offset = offset.into();
        self
    }

    /// Record the query that produced this data
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// The data type tag, e.g. `bash:history:command`
    pub fn data_type(&self) -> &'static str {
        self.attributes.data_type()
    }

    /// Source-relative locator, if known
    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    /// Query that produced this data, for relational sources
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The format-specific attributes
    pub fn attributes(&self) -> &EventAttributes {
        &self.attributes
    }
}

/// Closed set of attribute records, one per artifact format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "data_type")]
pub enum EventAttributes {
    /// A command from a Bash history file
    #[serde(rename = "bash:history:command")]
    BashHistory(BashHistoryCommand),

    /// A command from a Zsh extended history file
    #[serde(rename = "shell:zsh:history")]
    ZshHistory(ZshHistoryCommand),

    /// A page visit from a Firefox places database
    #[serde(rename = "firefox:places:page_visited")]
    FirefoxPageVisited(FirefoxPageVisited),

    /// A bookmark from a Firefox places database, host decoded from `rev_host`
    #[serde(rename = "firefox:places:bookmark")]
    FirefoxBookmark(FirefoxBookmark),

    /// A bookmark annotation from a Firefox places database
    #[serde(rename = "firefox:places:bookmark_annotation")]
    FirefoxBookmarkAnnotation(FirefoxBookmarkAnnotation),

    /// A bookmark folder from a Firefox places database
    #[serde(rename = "firefox:places:bookmark_folder")]
    FirefoxBookmarkFolder(FirefoxBookmarkFolder),

    /// A download from a Firefox downloads database
    #[serde(rename = "firefox:downloads:download")]
    FirefoxDownload(FirefoxDownload),
}

impl EventAttributes {
    /// The data type tag of this variant
    pub fn data_type(&self) -> &'static str {
        match self {
            EventAttributes::BashHistory(_) => "bash:history:command",
            EventAttributes::ZshHistory(_) => "shell:zsh:history",
            EventAttributes::FirefoxPageVisited(_) => "firefox:places:page_visited",
            EventAttributes::FirefoxBookmark(_) => "firefox:places:bookmark",
            EventAttributes::FirefoxBookmarkAnnotation(_) => "firefox:places:bookmark_annotation",
            EventAttributes::FirefoxBookmarkFolder(_) => "firefox:places:bookmark_folder",
            EventAttributes::FirefoxDownload(_) => "firefox:downloads:download",
        }
    }
}

/// Bash history command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BashHistoryCommand {
    /// Command that was executed
    pub command: String,
}

/// Zsh extended history command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZshHistoryCommand {
    /// Command that was executed
    pub command: String,

    /// Number of seconds the command took to execute
    pub elapsed_seconds: i64,
}

/// Firefox page visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirefoxPageVisited {
    /// Visited hostname
    pub host: String,

    /// Title of the visited page
    pub title: Option<String>,

    /// URL of the visited page
    pub url: Option<String>,

    /// Number of visits to the URL
    pub visit_count: Option<i64>,

    /// Transition type of the visit
    pub visit_type: Option<i64>,

    /// Derived annotations, in a fixed order: visited-from, hidden, typed
    pub extra: Vec<String>,
}

/// Kind of a Firefox bookmark entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookmarkKind {
    /// A bookmarked URL
    #[serde(rename = "URL")]
    Url,
    /// A bookmark folder
    Folder,
    /// A separator line
    Separator,
    /// Any other stored type value
    #[serde(rename = "N/A")]
    Unknown,
}

impl BookmarkKind {
    /// Map the stored `moz_bookmarks.type` value
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(1) => BookmarkKind::Url,
            Some(2) => BookmarkKind::Folder,
            Some(3) => BookmarkKind::Separator,
            _ => BookmarkKind::Unknown,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BookmarkKind::Url => "URL",
            BookmarkKind::Folder => "Folder",
            BookmarkKind::Separator => "Separator",
            BookmarkKind::Unknown => "N/A",
        }
    }
}

/// Firefox bookmark
///
/// `host` holds the readable hostname decoded from `moz_places.rev_host`,
/// not the reversed form Firefox stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirefoxBookmark {
    /// Hostname decoded from `rev_host`, or `N/A` when not stored
    pub host: String,

    /// Title of the bookmarked place
    pub places_title: Option<String>,

    /// Title of the bookmark
    pub title: Option<String>,

    /// Kind of bookmark entry
    #[serde(rename = "type")]
    pub kind: BookmarkKind,

    /// Bookmarked URL
    pub url: Option<String>,

    /// Number of visits to the URL
    pub visit_count: Option<i64>,
}

/// Firefox bookmark annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirefoxBookmarkAnnotation {
    /// Annotation content
    pub content: Option<String>,

    /// Title of the annotated bookmark
    pub title: Option<String>,

    /// Bookmarked URL
    pub url: Option<String>,
}

/// Firefox bookmark folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirefoxBookmarkFolder {
    /// Folder title, `N/A` when not stored
    pub title: String,
}

/// Firefox download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirefoxDownload {
    /// Full path of the download target
    pub full_path: Option<String>,

    /// MIME type of the download
    pub mime_type: Option<String>,

    /// Name of the download
    pub name: Option<String>,

    /// Number of bytes received
    pub received_bytes: Option<i64>,

    /// Referrer URL
    pub referrer: Option<String>,

    /// Temporary location of the download
    pub temporary_location: Option<String>,

    /// Total number of bytes of the download
    pub total_bytes: Option<i64>,

    /// Source URL of the download
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_matches_serialized_tag() {
        let data = EventData::new(EventAttributes::BashHistory(BashHistoryCommand {
            command: "ls -la".to_string(),
        }))
        .with_offset(0);

        let json = serde_json::to_value(data.attributes()).unwrap();
        assert_eq!(json["data_type"], data.data_type());
        assert_eq!(json["command"], "ls -la");
        assert_eq!(data.offset(), Some(0));
        assert_eq!(data.query(), None);
    }

    #[test]
    fn test_bookmark_kind_mapping() {
        assert_eq!(BookmarkKind::from_code(Some(1)), BookmarkKind::Url);
        assert_eq!(BookmarkKind::from_code(Some(2)), BookmarkKind::Folder);
        assert_eq!(BookmarkKind::from_code(Some(3)), BookmarkKind::Separator);
        assert_eq!(BookmarkKind::from_code(Some(9)), BookmarkKind::Unknown);
        assert_eq!(BookmarkKind::from_code(None).as_str(), "N/A");
    }

    #[test]
    fn test_bookmark_kind_serializes_as_label() {
        let bookmark = FirefoxBookmark {
            host: "N/A".to_string(),
            places_title: None,
            title: Some("Plaso".to_string()),
            kind: BookmarkKind::Url,
            url: None,
            visit_count: Some(1),
        };
        let json = serde_json::to_value(&bookmark).unwrap();
        assert_eq!(json["type"], "URL");
    }
}
