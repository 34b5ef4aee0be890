//! Events - the uniform output of every extraction plugin

use crate::event_data::EventData;
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What a timestamp means for the fact it is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampRole {
    /// The fact came into existence
    Creation,
    /// The fact was last changed
    Modification,
    /// The fact was added to a collection (e.g. a bookmark)
    Added,
    /// A page was visited
    LastVisited,
    /// An activity started
    Start,
    /// An activity ended
    End,
}

impl TimestampRole {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TimestampRole::Creation => "creation",
            TimestampRole::Modification => "modification",
            TimestampRole::Added => "added",
            TimestampRole::LastVisited => "last_visited",
            TimestampRole::Start => "start",
            TimestampRole::End => "end",
        }
    }

    /// Human readable description used in timelines
    pub fn description(&self) -> &'static str {
        match self {
            TimestampRole::Creation => "Creation Time",
            TimestampRole::Modification => "Content Modification Time",
            TimestampRole::Added => "Added Time",
            TimestampRole::LastVisited => "Last Visited Time",
            TimestampRole::Start => "Start Time",
            TimestampRole::End => "End Time",
        }
    }

    /// Parse a role from its string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "creation" => Some(TimestampRole::Creation),
            "modification" => Some(TimestampRole::Modification),
            "added" => Some(TimestampRole::Added),
            "last_visited" => Some(TimestampRole::LastVisited),
            "start" => Some(TimestampRole::Start),
            "end" => Some(TimestampRole::End),
            _ => None,
        }
    }
}

impl std::str::FromStr for TimestampRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid timestamp role: {}", s))
    }
}

impl fmt::Display for TimestampRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Where an event came from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventOrigin {
    /// Parsers and plugins that produced the event, e.g. `sqlite/firefox_history`
    pub parser_chain: String,

    /// Display name of the input source
    pub source: String,
}

/// One (timestamp, timestamp role, event data) triple
///
/// A source record with several populated timestamp fields yields one event
/// per field; those events share the same [`EventData`] through an `Arc`.
/// Events are immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    timestamp: Timestamp,
    timestamp_role: TimestampRole,
    data: Arc<EventData>,
    origin: EventOrigin,
}

impl Event {
    /// Create a new event
    pub fn new(
        timestamp: Timestamp,
        timestamp_role: TimestampRole,
        data: Arc<EventData>,
        origin: EventOrigin,
    ) -> Self {
        Self {
            timestamp,
            timestamp_role,
            data,
            origin,
        }
    }

    /// When the fact happened
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// What the timestamp means
    pub fn timestamp_role(&self) -> TimestampRole {
        self.timestamp_role
    }

    /// The format-specific payload
    pub fn data(&self) -> &EventData {
        &self.data
    }

    /// Shared handle to the payload
    pub fn shared_data(&self) -> &Arc<EventData> {
        &self.data
    }

    /// Parser chain and source attribution
    pub fn origin(&self) -> &EventOrigin {
        &self.origin
    }
}

/// A non-fatal problem encountered while extracting from a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionWarning {
    /// Parsers and plugins active when the problem was found
    pub parser_chain: String,

    /// Display name of the input source
    pub source: String,

    /// Description of the problem
    pub message: String,
}
