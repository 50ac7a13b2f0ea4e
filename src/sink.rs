use crate::event::LogEvent;
use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;

/// Synchronous destination for [`LogEvent`]s.
///
/// The tracer calls `emit` inline, in the order events are built, from
/// whatever task runs the traced operation. Implementations are shared by
/// every concurrent invocation, so they must be `Send + Sync` and must
/// not block the caller indefinitely.
pub trait EventSink: Send + Sync {
    /// Accept one fully built event.
    fn emit(&self, event: LogEvent);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: LogEvent) {
        (**self).emit(event)
    }
}

/// Asynchronous backend for [`LogEvent`]s.
///
/// Implementations transport events to a concrete store (a database, a
/// queue, stdout, etc). They are driven by
/// [`BatchingSink`](crate::batch::BatchingSink) from a background task
/// and never awaited on the application task.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Send a single event to the underlying backend.
    ///
    /// **Parameters**
    /// - `event`: fully-populated [`LogEvent`].
    ///
    /// **Returns**
    /// - `Ok(())` if the event was accepted by the backend.
    /// - `Err(..)` if the backend failed. The batching task treats this
    ///   as transient and retries the batch with backoff.
    async fn send(&self, event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffered events, if the backend implements buffering.
    ///
    /// Default implementation is a no-op.
    async fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
