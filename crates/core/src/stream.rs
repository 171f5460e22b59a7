use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// A message stream as stored by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    /// Host-assigned stream identifier.
    pub id: String,

    /// Display title shown in the host UI.
    pub title: String,
}

impl Stream {
    /// Create a stream with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Read-only access to the host's stream storage.
///
/// Notifiers use this to turn the stream ids carried by an
/// [`Event`](crate::Event) into display titles for deep links.
pub trait StreamLookup: Send + Sync {
    /// Load the streams with the given ids, ordered by id.
    ///
    /// Ids the host does not know are skipped.
    fn load_by_ids(&self, ids: &BTreeSet<String>) -> Vec<Stream>;
}

/// A [`StreamLookup`] backed by an in-process map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStreams {
    streams: BTreeMap<String, Stream>,
}

impl InMemoryStreams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stream, replacing any previous stream with the same id.
    #[must_use]
    pub fn with_stream(mut self, stream: Stream) -> Self {
        self.insert(stream);
        self
    }

    pub fn insert(&mut self, stream: Stream) {
        self.streams.insert(stream.id.clone(), stream);
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

impl StreamLookup for InMemoryStreams {
    fn load_by_ids(&self, ids: &BTreeSet<String>) -> Vec<Stream> {
        ids.iter()
            .filter_map(|id| self.streams.get(id).cloned())
            .collect()
    }
}
