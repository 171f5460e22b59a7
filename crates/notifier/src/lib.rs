//! The port between the host's alert dispatch loop and a notifier.
//!
//! The host resolves a [`NotificationContext`](pagerlog_core::NotificationContext)
//! for every alert and calls [`Notifier::notify`] once. A notifier either
//! fully succeeds or returns a [`NotifyError`]; retry policy belongs to the
//! host.

pub mod error;
pub mod notifier;

pub use error::NotifyError;
pub use notifier::{DynNotifier, Notifier};
