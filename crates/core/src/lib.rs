//! Host-owned types handed to pagerlog notifiers.
//!
//! Everything in this crate is read-only input: the host evaluates alerts,
//! owns stream storage and stores notification configuration. Notifiers only
//! consume these values.

pub mod context;
pub mod event;
pub mod stream;

pub use context::NotificationContext;
pub use event::{Event, EventDefinition};
pub use stream::{InMemoryStreams, Stream, StreamLookup};
