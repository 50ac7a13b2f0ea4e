use serde::{Deserialize, Serialize};
use std::fmt;

/// Category label attached to every event.
///
/// A marker never changes an event's severity. The lifecycle markers
/// produced by [`Marker::start`], [`Marker::end`] and [`Marker::error`]
/// keep the caller's marker as a reference instead of replacing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marker {
    name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    references: Vec<Marker>,
}

impl Marker {
    pub const DEV: &'static str = "DEV";
    pub const START: &'static str = "START";
    pub const END: &'static str = "END";
    pub const ERROR: &'static str = "ERROR";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            references: Vec::new(),
        }
    }

    pub fn with_references(name: impl Into<String>, references: Vec<Marker>) -> Self {
        Self {
            name: name.into(),
            references,
        }
    }

    /// Generic developer-facing category used when none is given.
    pub fn dev() -> Self {
        Self::new(Self::DEV)
    }

    pub fn start(category: &Marker) -> Self {
        Self::with_references(Self::START, vec![category.clone()])
    }

    pub fn end(category: &Marker) -> Self {
        Self::with_references(Self::END, vec![category.clone()])
    }

    pub fn error(category: &Marker) -> Self {
        Self::with_references(Self::ERROR, vec![category.clone()])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn references(&self) -> &[Marker] {
        &self.references
    }

    /// `true` if this marker or any marker it references is named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.name == name || self.references.iter().any(|m| m.contains(name))
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self::dev()
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some((first, rest)) = self.references.split_first() {
            write!(f, "[{}", first)?;
            for m in rest {
                write!(f, ", {}", m)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}
