use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::level::Level;
use crate::marker::Marker;

/// Reserved attribute key under which a structured payload is appended.
pub const DATA_KEY: &str = "data";

/// Attribute carrying the elapsed milliseconds on a finish event.
pub const METRIC_HANDLE_TIME_KEY: &str = "metricHandleTime";

/// One structured log record, built by
/// [`EventBuilder`](crate::builder::EventBuilder) and handed to a sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub marker: Marker,
    pub message: String,
    pub logger: String,
    pub thread: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<ErrorCause>,
    #[serde(serialize_with = "serialize_attributes")]
    pub attributes: Vec<(String, Value)>,
}

impl LogEvent {
    /// First attribute named `key`, if any.
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Payload appended by the builder, if one was supplied.
    pub fn payload(&self) -> Option<&Value> {
        self.attributes
            .last()
            .filter(|(k, _)| k == DATA_KEY)
            .map(|(_, v)| v)
    }

    /// Elapsed milliseconds recorded on a finish event.
    pub fn handle_time_ms(&self) -> Option<u64> {
        self.attribute(METRIC_HANDLE_TIME_KEY).and_then(Value::as_u64)
    }

    /// Attributes rendered as a JSON object in insertion order.
    pub fn attributes_json(&self) -> String {
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::new(&mut out);
        match serialize_attributes(&self.attributes, &mut ser) {
            Ok(()) => String::from_utf8(out).unwrap_or_default(),
            Err(_) => "{}".to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Writes attributes as a map, preserving order and duplicate keys.
fn serialize_attributes<S>(attributes: &[(String, Value)], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(attributes.len()))?;
    for (k, v) in attributes {
        map.serialize_entry(k, v)?;
    }
    map.end()
}

/// How an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CauseKind {
    /// The callable returned an error.
    Failed,
    /// The traced future was dropped before the callable finished.
    Cancelled,
    /// The callable panicked.
    Panicked,
}

/// Snapshot of the value that failed an operation.
///
/// The error itself stays with the caller; the event keeps its `Display`
/// and `Debug` renderings verbatim together with its type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorCause {
    pub kind: CauseKind,
    pub type_name: String,
    pub message: String,
    pub debug: String,
}

impl ErrorCause {
    pub fn capture<E>(error: &E) -> Self
    where
        E: fmt::Display + fmt::Debug + ?Sized,
    {
        Self {
            kind: CauseKind::Failed,
            type_name: std::any::type_name::<E>().to_string(),
            message: error.to_string(),
            debug: format!("{:?}", error),
        }
    }

    pub fn cancelled() -> Self {
        Self::interrupted(CauseKind::Cancelled, "operation cancelled before completion")
    }

    pub fn panicked() -> Self {
        Self::interrupted(CauseKind::Panicked, "operation panicked")
    }

    fn interrupted(kind: CauseKind, message: &str) -> Self {
        Self {
            kind,
            type_name: String::new(),
            message: message.to_string(),
            debug: message.to_string(),
        }
    }
}

impl fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
