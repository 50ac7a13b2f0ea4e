use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseLevelError;

/// Severity of a [`LogEvent`](crate::event::LogEvent).
///
/// Levels are ordered by their numeric [`weight`](Level::weight), not by
/// declaration order, so threshold checks such as [`Level::is_error`]
/// compare weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Fatal,
    Error,
    Warning,
    Info,
    Debug,
    #[default]
    Trace,
}

impl Level {
    pub const ALL: [Level; 6] = [
        Level::Fatal,
        Level::Error,
        Level::Warning,
        Level::Info,
        Level::Debug,
        Level::Trace,
    ];

    pub const fn weight(self) -> u8 {
        match self {
            Level::Fatal => 90,
            Level::Error => 70,
            Level::Warning => 40,
            Level::Info => 20,
            Level::Debug => 10,
            Level::Trace => 0,
        }
    }

    /// `true` for [`Level::Error`] and anything weighing more.
    pub const fn is_error(self) -> bool {
        self.weight() >= Level::Error.weight()
    }

    /// `true` only for [`Level::Warning`] itself.
    pub const fn is_warning(self) -> bool {
        matches!(self, Level::Warning)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Fatal => "FATAL",
            Level::Error => "ERROR",
            Level::Warning => "WARNING",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    /// Closest `tracing` level. `tracing` has no fatal level, so
    /// [`Level::Fatal`] collapses into `ERROR`.
    pub const fn as_tracing(self) -> tracing::Level {
        match self {
            Level::Fatal | Level::Error => tracing::Level::ERROR,
            Level::Warning => tracing::Level::WARN,
            Level::Info => tracing::Level::INFO,
            Level::Debug => tracing::Level::DEBUG,
            Level::Trace => tracing::Level::TRACE,
        }
    }
}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight().cmp(&other.weight())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FATAL" => Ok(Level::Fatal),
            "ERROR" => Ok(Level::Error),
            "WARNING" | "WARN" => Ok(Level::Warning),
            "INFO" => Ok(Level::Info),
            "DEBUG" => Ok(Level::Debug),
            "TRACE" => Ok(Level::Trace),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}
