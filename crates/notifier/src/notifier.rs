use async_trait::async_trait;
use pagerlog_core::NotificationContext;

use crate::error::NotifyError;

/// Strongly-typed notifier trait with native `async fn`.
///
/// This trait is **not** object-safe because it uses native `async fn` methods
/// (which desugar to opaque `impl Future` return types). Hosts that keep
/// notifiers behind a trait object use [`DynNotifier`] instead -- every
/// `Notifier` automatically implements `DynNotifier` via a blanket
/// implementation.
pub trait Notifier: Send + Sync {
    /// Returns the unique name of this notifier.
    fn name(&self) -> &str;

    /// Deliver one notification for the given alert.
    ///
    /// Called once per alert. Invocations for different alerts may run
    /// concurrently and must not share mutable state.
    fn notify(
        &self,
        ctx: &NotificationContext,
    ) -> impl std::future::Future<Output = Result<(), NotifyError>> + Send;
}

/// Object-safe notifier trait for use behind `Arc<dyn DynNotifier>`.
///
/// You generally should not implement this trait directly -- instead
/// implement [`Notifier`] and rely on the blanket implementation.
#[async_trait]
pub trait DynNotifier: Send + Sync {
    /// Returns the unique name of this notifier.
    fn name(&self) -> &str;

    /// Deliver one notification for the given alert.
    async fn notify(&self, ctx: &NotificationContext) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: Notifier + Sync> DynNotifier for T {
    fn name(&self) -> &str {
        Notifier::name(self)
    }

    async fn notify(&self, ctx: &NotificationContext) -> Result<(), NotifyError> {
        Notifier::notify(self, ctx).await
    }
}
