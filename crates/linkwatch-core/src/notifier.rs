//! The notification capability shared by every alert channel.

use std::future::Future;
use std::pin::Pin;

use crate::types::NotificationRequest;

/// Boxed future returned by the object-safe capability traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A channel able to deliver a [`NotificationRequest`].
///
/// Implementations bound their own network call, log any failure, and
/// report it through the returned `bool`. They never return an error: a
/// lost alert must not stop the caller from moving on to its next step.
pub trait Notifier: Send + Sync {
    /// Short channel name used in log lines.
    fn channel(&self) -> &'static str;

    /// Deliver the request. Returns `true` on confirmed delivery.
    fn dispatch<'a>(&'a self, request: &'a NotificationRequest) -> BoxFuture<'a, bool>;
}
