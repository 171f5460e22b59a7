use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// An event produced by the host's alert evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Host-assigned event identifier.
    pub id: String,

    /// Human-readable event message.
    pub message: String,

    /// When the event happened, in the host's local offset.
    pub event_timestamp: DateTime<FixedOffset>,

    /// Ids of the streams whose messages produced this event.
    #[serde(default)]
    pub source_streams: BTreeSet<String>,
}

impl Event {
    /// Create an event with no source streams.
    pub fn new(
        id: impl Into<String>,
        message: impl Into<String>,
        event_timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            event_timestamp,
            source_streams: BTreeSet::new(),
        }
    }

    /// Add a source stream id.
    #[must_use]
    pub fn with_source_stream(mut self, stream_id: impl Into<String>) -> Self {
        self.source_streams.insert(stream_id.into());
        self
    }

    /// Render the source stream ids as `[a, b]`, in id order.
    pub fn source_stream_list(&self) -> String {
        let ids: Vec<&str> = self.source_streams.iter().map(String::as_str).collect();
        format!("[{}]", ids.join(", "))
    }
}

/// The definition an [`Event`] was evaluated from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDefinition {
    pub id: String,

    /// Title shown to operators; used in deduplication keys.
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Priority ordinal. The host uses 1 (low), 2 (normal) and 3 (high).
    pub priority: i64,

    /// Search query of an aggregation definition, if any.
    #[serde(default)]
    pub query: Option<String>,
}

impl EventDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>, priority: i64) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            priority,
            query: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the aggregation search query.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}
