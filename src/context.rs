use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::builder::EventBuilder;
use crate::operation::{FailurePolicy, Operation, Outcome};
use crate::sink::EventSink;
use crate::tracing_sink::TracingSink;

/// Named handle through which application code logs and traces
/// operations.
///
/// A context is a sink plus a logger identifier. It is cheap to clone and
/// can be shared freely between tasks; every traced invocation keeps its
/// own state, so the sink is the only thing concurrent callers share.
#[derive(Clone)]
pub struct LogContext {
    sink: Arc<dyn EventSink>,
    logger_id: Arc<str>,
}

impl LogContext {
    pub fn new(sink: Arc<dyn EventSink>, logger_id: impl Into<String>) -> Self {
        let logger_id: String = logger_id.into();
        Self {
            sink,
            logger_id: Arc::from(logger_id),
        }
    }

    /// Context that forwards into the installed `tracing` subscriber.
    pub fn tracing(logger_id: impl Into<String>) -> Self {
        Self::new(Arc::new(TracingSink), logger_id)
    }

    /// Context named after `T`, e.g. `my_service::RatingRoutes`.
    pub fn for_type<T: ?Sized>(sink: Arc<dyn EventSink>) -> Self {
        Self::new(sink, std::any::type_name::<T>())
    }

    pub fn logger_id(&self) -> &str {
        &self.logger_id
    }

    /// Build `event` under this context's logger id and emit it.
    pub fn log(&self, event: EventBuilder) {
        self.sink.emit(event.logger(&*self.logger_id).build());
    }

    /// Start describing a traced operation named `operation_id`.
    pub fn operation(&self, operation_id: impl Into<String>) -> Operation<'_> {
        Operation::new(self, operation_id.into())
    }

    /// [`Operation::trace_required`] with the default category and
    /// [`Level::Info`](crate::level::Level::Info).
    pub async fn trace_required<F, Fut, T, E>(&self, operation_id: &str, callable: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display + fmt::Debug,
    {
        self.operation(operation_id).trace_required(callable).await
    }

    /// [`Operation::trace_optional`] with the default category.
    pub async fn trace_optional<F, Fut, T, E>(
        &self,
        operation_id: &str,
        policy: FailurePolicy,
        callable: F,
    ) -> Result<Outcome<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display + fmt::Debug,
    {
        self.operation(operation_id)
            .on_failure(policy)
            .trace_optional(callable)
            .await
    }
}

impl fmt::Debug for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogContext")
            .field("logger_id", &self.logger_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::memory_sink::MemorySink;
    use serde_json::json;

    struct RatingRoutes;

    #[test]
    fn log_stamps_logger_id() {
        let sink = MemorySink::new();
        let ctx = LogContext::new(Arc::new(sink.clone()), "ratings");

        ctx.log(
            EventBuilder::new("Request for rating-create")
                .level(Level::Info)
                .payload(json!({"title": "film"})),
        );

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].logger, "ratings");
        assert_eq!(events[0].payload(), Some(&json!({"title": "film"})));
    }

    #[test]
    fn for_type_uses_type_name() {
        let ctx = LogContext::for_type::<RatingRoutes>(Arc::new(MemorySink::new()));
        assert!(ctx.logger_id().ends_with("RatingRoutes"));
        assert!(format!("{:?}", ctx).contains("RatingRoutes"));
    }

    #[tokio::test]
    async fn shortcuts_use_defaults() {
        let sink = MemorySink::new();
        let ctx = LogContext::new(Arc::new(sink.clone()), "svc");

        let value = ctx
            .trace_required("load", || async { Ok::<_, String>(3) })
            .await
            .unwrap();
        assert_eq!(value, 3);

        let outcome = ctx
            .trace_optional("store", FailurePolicy::Suppress, || async {
                Err::<(), _>("disk full".to_string())
            })
            .await
            .unwrap();
        assert!(outcome.is_suppressed());

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].level, Level::Info);
        assert_eq!(events[0].marker.references()[0].name(), "DEV");
        assert_eq!(events[2].message, "Failing store");
    }
}
