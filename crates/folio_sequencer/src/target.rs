// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animation targets.
//!
//! A target is an explicit handle for one animated element. Rendering layers
//! map the handle back to whatever they draw; the sequencer only ever sees the
//! id, a name for logs, and the element's resting property values.

use crate::property::{Property, PropertySet, PropertyValue};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub Uuid);

impl TargetId {
    /// Create a new random target ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TargetId {
    fn default() -> Self {
        Self::new()
    }
}

/// An animated element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Unique target ID
    pub id: TargetId,
    /// Name used in logs and snapshots
    pub name: String,
    /// Property values before any segment runs
    pub initial: PropertySet,
}

impl Target {
    /// Create a target with default resting values
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TargetId::new(),
            name: name.into(),
            initial: PropertySet::new(),
        }
    }

    /// Set a resting value
    pub fn with_initial(mut self, property: Property, value: impl Into<PropertyValue>) -> Self {
        self.initial.set(property, value);
        self
    }

    /// Create one target per character of `text`, skipping whitespace
    ///
    /// Names are `{prefix}[{index}]`.
    pub fn split_chars(prefix: &str, text: &str) -> Vec<Target> {
        text.chars()
            .filter(|c| !c.is_whitespace())
            .enumerate()
            .map(|(i, _)| Target::new(format!("{prefix}[{i}]")))
            .collect()
    }

    /// Create one target per whitespace-separated word of `text`
    pub fn split_words(prefix: &str, text: &str) -> Vec<Target> {
        text.split_whitespace()
            .enumerate()
            .map(|(i, _)| Target::new(format!("{prefix}[{i}]")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_chars_skips_whitespace() {
        let targets = Target::split_chars("title", "ab c");
        assert_eq!(targets.len(), 3);
        assert_eq!(targets[2].name, "title[2]");
    }

    #[test]
    fn test_split_words() {
        let targets = Target::split_words("welcome", "Hi,  Welcome 👋");
        assert_eq!(targets.len(), 3);
        assert_ne!(targets[0].id, targets[1].id);
    }

    #[test]
    fn test_initial_values() {
        let target = Target::new("section").with_initial(Property::Opacity, 0.0);
        assert_eq!(target.initial.float(Property::Opacity), 0.0);
        assert_eq!(target.initial.float(Property::Scale), 1.0);
    }
}
