use crate::event::LogEvent;
use crate::sink::{EventSink, LogSink};
use async_trait::async_trait;
use std::error::Error;

/// A sink that simply drops all events.
///
/// Useful for measuring the overhead of tracing itself without any
/// output, and for callers that want tracing switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: LogEvent) {}
}

#[async_trait]
impl LogSink for NoopSink {
    async fn send(&self, _event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
