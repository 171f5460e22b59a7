//! `PagerDuty` notifier for pagerlog.
//!
//! This crate implements the [`Notifier`](pagerlog_notifier::Notifier) port,
//! triggering `PagerDuty` incidents for host alerts through either the
//! [Events API v2](https://developer.pagerduty.com/docs/events-api-v2/overview/)
//! enqueue endpoint or the legacy v1 generic events endpoint.
//!
//! The pieces can also be used on their own:
//!
//! - [`NotificationConfig`] is the user's configuration; [`NotificationConfig::validate`]
//!   collects every field error in one pass.
//! - [`MessageBuilder`] maps an alert into a [`PagerDutyMessage`] without I/O.
//! - [`HttpDispatcher`] posts a message over a [`Transport`] and interprets the
//!   response.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pagerlog_core::{InMemoryStreams, Stream};
//! use pagerlog_pagerduty::{NotificationConfig, PagerDutyNotifier};
//!
//! let config = NotificationConfig::builder()
//!     .routing_key("01234567890123456789012345678901")
//!     .custom_incident(true)
//!     .key_prefix("Graylog")
//!     .client_name("Graylog")
//!     .client_url("https://graylog.example.com")
//!     .build();
//! assert!(config.validate().is_valid());
//!
//! let streams = InMemoryStreams::new().with_stream(Stream::new("0001", "All errors"));
//! let notifier = PagerDutyNotifier::new(Arc::new(streams));
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod notifier;
pub mod transport;
pub mod types;
pub mod validation;

pub use client::{DEFAULT_API_BASE_URL, HttpDispatcher};
pub use config::{ApiVersion, NotificationConfig, NotificationConfigBuilder};
pub use error::PagerDutyError;
pub use message::MessageBuilder;
pub use notifier::PagerDutyNotifier;
pub use transport::{
    RawResponse, ReqwestTransport, ReqwestTransportFactory, ScopedTransport, Transport,
    TransportFactory,
};
pub use types::{
    EnqueueEvent, EventPayload, GenericDetails, GenericEvent, Link, LinkContext, PagerDutyMessage,
    PagerDutyResponse, Severity,
};
pub use validation::ValidationResult;
