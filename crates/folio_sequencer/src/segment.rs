// SPDX-License-Identifier: MIT OR Apache-2.0
//! Segment definitions for the timeline.

use crate::ease::Ease;
use crate::property::{Property, PropertySet, PropertyValue};
use crate::target::TargetId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub Uuid);

impl SegmentId {
    /// Create a new random segment ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SegmentId {
    fn default() -> Self {
        Self::new()
    }
}

/// How a segment's end states were specified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TweenKind {
    /// Animate from the current state to the given values
    To,
    /// Animate from the given values to the current state
    From,
    /// Animate between two explicit states
    FromTo,
    /// Jump to the given values
    Set,
}

impl TweenKind {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::To => "to",
            Self::From => "from",
            Self::FromTo => "fromTo",
            Self::Set => "set",
        }
    }

    /// Whether the from-state is shown before the segment starts
    ///
    /// Segments with an explicit from-state hold it until they begin, so an
    /// element that fades in later is hidden from the first frame.
    pub fn renders_immediately(&self) -> bool {
        matches!(self, Self::From | Self::FromTo)
    }
}

/// One animated transition of one target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    /// Unique segment ID
    pub id: SegmentId,
    /// Animated target
    pub target: TargetId,
    /// How the segment was specified
    pub kind: TweenKind,
    /// Values at the start of the segment
    pub from: PropertySet,
    /// Values at the end of the segment
    pub to: PropertySet,
    /// Easing curve
    pub ease: Ease,
    /// Start in timeline seconds
    pub start: f32,
    /// Length in timeline seconds
    pub duration: f32,
    /// Index of the target within its batch
    pub batch_index: usize,
    /// Whether the segment starts before the previously placed one
    pub parallel: bool,
}

impl Segment {
    /// End in timeline seconds
    pub fn end(&self) -> f32 {
        self.start + self.duration
    }

    /// Whether the segment writes `property`
    pub fn writes(&self, property: Property) -> bool {
        self.to.contains(property)
    }

    /// Linear progress through the segment at `time`, `None` before it starts
    pub fn progress_at(&self, time: f32) -> Option<f32> {
        if time < self.start {
            return None;
        }
        if self.duration <= 0.0 {
            return Some(1.0);
        }
        Some(((time - self.start) / self.duration).min(1.0))
    }

    /// Value of `property` at `time`, `None` if not written or not yet started
    pub fn value_at(&self, property: Property, time: f32) -> Option<PropertyValue> {
        let end = self.to.get(property)?;
        let progress = self.progress_at(time)?;
        if progress >= 1.0 {
            return Some(end);
        }
        let start = self.from.get(property).unwrap_or(end);
        Some(start.interpolate(&end, self.ease.apply(progress)))
    }

    /// Value shown before the segment starts, if it renders immediately
    pub fn pending_value(&self, property: Property) -> Option<PropertyValue> {
        if !self.kind.renders_immediately() {
            return None;
        }
        self.from.get(property)
    }
}

/// Start and end of one segment, for inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentTiming {
    /// Segment ID
    pub segment: SegmentId,
    /// Animated target
    pub target: TargetId,
    /// Index of the target within its batch
    pub batch_index: usize,
    /// Start in timeline seconds
    pub start: f32,
    /// End in timeline seconds
    pub end: f32,
}

impl From<&Segment> for SegmentTiming {
    fn from(segment: &Segment) -> Self {
        Self {
            segment: segment.id,
            target: segment.target,
            batch_index: segment.batch_index,
            start: segment.start,
            end: segment.end(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fade(kind: TweenKind, start: f32, duration: f32) -> Segment {
        Segment {
            id: SegmentId::new(),
            target: TargetId::new(),
            kind,
            from: PropertySet::new().with(Property::Opacity, 0.0),
            to: PropertySet::new().with(Property::Opacity, 1.0),
            ease: Ease::Linear,
            start,
            duration,
            batch_index: 0,
            parallel: false,
        }
    }

    #[test]
    fn test_value_before_during_after() {
        let segment = fade(TweenKind::To, 1.0, 2.0);
        assert_eq!(segment.value_at(Property::Opacity, 0.5), None);
        assert_eq!(
            segment.value_at(Property::Opacity, 2.0),
            Some(PropertyValue::Float(0.5))
        );
        assert_eq!(
            segment.value_at(Property::Opacity, 10.0),
            Some(PropertyValue::Float(1.0))
        );
        assert_eq!(segment.value_at(Property::X, 2.0), None);
    }

    #[test]
    fn test_zero_duration_applies_at_start() {
        let segment = fade(TweenKind::Set, 3.0, 0.0);
        assert_eq!(segment.progress_at(2.999), None);
        assert_eq!(segment.progress_at(3.0), Some(1.0));
    }

    #[test]
    fn test_pending_value_only_for_explicit_from() {
        assert_eq!(
            fade(TweenKind::FromTo, 1.0, 1.0).pending_value(Property::Opacity),
            Some(PropertyValue::Float(0.0))
        );
        assert_eq!(fade(TweenKind::To, 1.0, 1.0).pending_value(Property::Opacity), None);
    }
}
