use crate::event::LogEvent;
use crate::sink::EventSink;
use std::sync::{Arc, Mutex, MutexGuard};

/// Sink that keeps every event in memory.
///
/// Clones share the same buffer, so a test can hand one clone to a
/// [`LogContext`](crate::context::LogContext) and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured events in emission order.
    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|e| e.message.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock must not hide later events.
    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: LogEvent) {
        self.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::EventBuilder;

    #[test]
    fn clones_share_buffer() {
        let sink = MemorySink::new();
        let other = sink.clone();
        other.emit(EventBuilder::new("one").build());
        other.emit(EventBuilder::new("two").build());

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.messages(), vec!["one", "two"]);

        sink.clear();
        assert!(other.is_empty());
    }

    #[test]
    fn works_behind_dyn_arc() {
        let sink = MemorySink::new();
        let shared: Arc<dyn EventSink> = Arc::new(sink.clone());
        shared.emit(EventBuilder::new("via arc").build());
        assert_eq!(sink.messages(), vec!["via arc"]);
    }
}
