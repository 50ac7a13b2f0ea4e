use chrono::Utc;
use serde::Serialize;
use serde_json::Value;

use crate::event::{ErrorCause, LogEvent, DATA_KEY};
use crate::level::Level;
use crate::marker::Marker;

/// Assembles a [`LogEvent`].
///
/// Building is pure: nothing is sent anywhere until the caller hands the
/// event to a sink. Unset fields fall back to an empty message,
/// [`Level::Trace`] and [`Marker::dev`].
#[derive(Debug, Clone, Default)]
pub struct EventBuilder {
    message: String,
    level: Level,
    marker: Marker,
    logger: String,
    cause: Option<ErrorCause>,
    payload: Option<Value>,
    attributes: Vec<(String, Value)>,
}

impl EventBuilder {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }

    pub fn logger(mut self, logger: impl Into<String>) -> Self {
        self.logger = logger.into();
        self
    }

    pub fn cause(mut self, cause: ErrorCause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Structured payload, appended last under the `data` key.
    pub fn payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Like [`payload`](Self::payload) for any serializable value.
    ///
    /// If serialization fails the payload becomes the error text, so the
    /// builder itself never fails.
    pub fn payload_serialize<T: Serialize + ?Sized>(self, payload: &T) -> Self {
        let value = serde_json::to_value(payload)
            .unwrap_or_else(|e| Value::String(format!("<unserializable payload: {}>", e)));
        self.payload(value)
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Adds the attribute only when both key and value are present.
    pub fn attr_opt<K, V>(self, key: Option<K>, value: Option<V>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        match (key, value) {
            (Some(k), Some(v)) => self.attr(k, v),
            _ => self,
        }
    }

    pub fn attrs<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (Option<K>, Option<V>)>,
        K: Into<String>,
        V: Into<Value>,
    {
        pairs
            .into_iter()
            .fold(self, |builder, (k, v)| builder.attr_opt(k, v))
    }

    pub fn build(self) -> LogEvent {
        let mut attributes = self.attributes;
        if let Some(payload) = self.payload {
            attributes.push((DATA_KEY.to_string(), payload));
        }

        LogEvent {
            timestamp: Utc::now(),
            level: self.level,
            marker: self.marker,
            message: self.message,
            logger: self.logger,
            thread: current_thread_label(),
            cause: self.cause,
            attributes,
        }
    }
}

fn current_thread_label() -> String {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", thread.id()),
    }
}
