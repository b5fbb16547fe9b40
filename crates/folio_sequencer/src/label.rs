// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named positions along a timeline.

use crate::error::{SequencerError, SequencerResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tolerance used when comparing label positions with the play-head
pub const POSITION_EPSILON: f32 = 1e-4;

/// A named marker on the timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// Label name
    pub name: String,
    /// Position in timeline seconds
    pub position: f32,
}

/// Mapping from label names to timeline positions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelIndex {
    labels: IndexMap<String, f32>,
}

impl LabelIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a label
    ///
    /// Fails with [`SequencerError::DuplicateLabel`] if the name is taken; the
    /// index is left untouched in that case.
    pub fn add_label(&mut self, name: impl Into<String>, position: f32) -> SequencerResult<()> {
        let name = name.into();
        if self.labels.contains_key(&name) {
            return Err(SequencerError::DuplicateLabel(name));
        }
        self.labels.insert(name, position);
        Ok(())
    }

    /// Look up a label's position
    pub fn resolve(&self, name: &str) -> SequencerResult<f32> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| SequencerError::UnknownLabel(name.to_string()))
    }

    /// Whether a label exists
    pub fn contains(&self, name: &str) -> bool {
        self.labels.contains_key(name)
    }

    /// Remove a label, returning its position
    pub fn remove(&mut self, name: &str) -> Option<f32> {
        self.labels.shift_remove(name)
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels sorted by position (insertion order breaks ties)
    pub fn ordered(&self) -> Vec<Label> {
        let mut labels: Vec<Label> = self
            .labels
            .iter()
            .map(|(name, position)| Label {
                name: name.clone(),
                position: *position,
            })
            .collect();
        labels.sort_by(|a, b| a.position.total_cmp(&b.position));
        labels
    }

    /// Label closest to `position`
    pub fn nearest(&self, position: f32) -> Option<Label> {
        self.ordered().into_iter().min_by(|a, b| {
            let da = (a.position - position).abs();
            let db = (b.position - position).abs();
            da.total_cmp(&db)
        })
    }

    /// First label strictly after `position`
    pub fn next_after(&self, position: f32) -> Option<Label> {
        self.ordered()
            .into_iter()
            .find(|l| l.position > position + POSITION_EPSILON)
    }

    /// Last label strictly before `position`
    pub fn previous_before(&self, position: f32) -> Option<Label> {
        self.ordered()
            .into_iter()
            .rev()
            .find(|l| l.position < position - POSITION_EPSILON)
    }

    /// Label with the lowest position
    pub fn first(&self) -> Option<Label> {
        self.ordered().into_iter().next()
    }

    /// Label with the highest position
    pub fn last(&self) -> Option<Label> {
        self.ordered().into_iter().next_back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> LabelIndex {
        let mut index = LabelIndex::new();
        index.add_label("welcome", 1.5).unwrap();
        index.add_label("hero", 0.0).unwrap();
        index.add_label("about", 6.0).unwrap();
        index
    }

    #[test]
    fn test_duplicate_label_leaves_index_unchanged() {
        let mut index = index();
        let err = index.add_label("welcome", 9.0).unwrap_err();
        assert_eq!(err, SequencerError::DuplicateLabel("welcome".into()));
        assert_eq!(index.len(), 3);
        assert_eq!(index.resolve("welcome").unwrap(), 1.5);
    }

    #[test]
    fn test_unknown_label() {
        let index = index();
        assert_eq!(
            index.resolve("nonexistent"),
            Err(SequencerError::UnknownLabel("nonexistent".into()))
        );
    }

    #[test]
    fn test_ordered_by_position() {
        let names: Vec<_> = index().ordered().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["hero", "welcome", "about"]);
    }

    #[test]
    fn test_navigation() {
        let index = index();
        assert_eq!(index.next_after(1.5).unwrap().name, "about");
        assert_eq!(index.previous_before(1.5).unwrap().name, "hero");
        assert!(index.next_after(6.0).is_none());
        assert!(index.previous_before(0.0).is_none());
        assert_eq!(index.nearest(4.0).unwrap().name, "about");
        assert_eq!(index.first().unwrap().name, "hero");
        assert_eq!(index.last().unwrap().name, "about");
    }

    #[test]
    fn test_remove() {
        let mut index = index();
        assert_eq!(index.remove("hero"), Some(0.0));
        assert!(!index.contains("hero"));
        assert!(index.remove("hero").is_none());
    }
}
