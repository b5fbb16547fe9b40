// SPDX-License-Identifier: MIT OR Apache-2.0
//! Segment builder.
//!
//! A [`Tween`] describes one animation call against a batch of targets. The
//! [`SegmentBuilder`] validates it, resolves where it starts, spreads the
//! batch with its stagger rule and turns it into one [`Segment`] per target
//! with concrete start and end states. Planning never mutates the timeline;
//! a rejected tween leaves everything as it was.

use crate::ease::Ease;
use crate::error::{SequencerError, SequencerResult};
use crate::property::{Property, PropertySet, PropertyValue};
use crate::segment::{Segment, SegmentId, TweenKind};
use crate::stagger::StaggerRule;
use crate::target::TargetId;
use crate::timeline::Timeline;
use crate::value::{Rng64, ValueSource};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Duration used when a tween names none
pub const DEFAULT_DURATION: f32 = 0.5;

/// Where a tween is placed on the timeline
///
/// Parsed from the usual position strings: `""` (end), `"2.5"` (absolute),
/// `"+=0.5"` / `"-=0.2"` (relative to the end), `"<"` (with the previous
/// insertion), `">"` (after the previous insertion), `"about"` and
/// `"about+=1"` (relative to a label).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Position {
    /// At the current end of the timeline
    #[default]
    End,
    /// At an absolute time
    Absolute(f32),
    /// Offset from the current end (negative values overlap)
    Relative(f32),
    /// At the start of the previous insertion
    WithPrevious,
    /// At the end of the previous insertion
    AfterPrevious,
    /// At a label
    Label(String),
    /// Offset from a label
    LabelOffset(String, f32),
}

/// Error returned when a position string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid position: {0}")]
pub struct ParsePositionError(pub String);

fn parse_offset(sign: char, digits: &str, source: &str) -> Result<f32, ParsePositionError> {
    let value: f32 = digits
        .trim()
        .parse()
        .map_err(|_| ParsePositionError(source.to_string()))?;
    Ok(if sign == '-' { -value } else { value })
}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed {
            "" => return Ok(Self::End),
            "<" => return Ok(Self::WithPrevious),
            ">" => return Ok(Self::AfterPrevious),
            _ => {}
        }

        if let Some(rest) = trimmed.strip_prefix("+=") {
            return parse_offset('+', rest, s).map(Self::Relative);
        }
        if let Some(rest) = trimmed.strip_prefix("-=") {
            return parse_offset('-', rest, s).map(Self::Relative);
        }
        if let Ok(time) = trimmed.parse::<f32>() {
            return Ok(Self::Absolute(time));
        }

        let split = trimmed.find("+=").or_else(|| trimmed.find("-="));
        match split {
            Some(idx) => {
                let (name, offset) = trimmed.split_at(idx);
                let sign = offset.chars().next().unwrap_or('+');
                let value = parse_offset(sign, &offset[2..], s)?;
                if name.is_empty() {
                    return Err(ParsePositionError(s.to_string()));
                }
                Ok(Self::LabelOffset(name.to_string(), value))
            }
            None => Ok(Self::Label(trimmed.to_string())),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let signed = |v: f32| {
            if v < 0.0 {
                format!("-={}", -v)
            } else {
                format!("+={v}")
            }
        };
        match self {
            Self::End => Ok(()),
            Self::Absolute(t) => write!(f, "{t}"),
            Self::Relative(d) => f.write_str(&signed(*d)),
            Self::WithPrevious => f.write_str("<"),
            Self::AfterPrevious => f.write_str(">"),
            Self::Label(name) => f.write_str(name),
            Self::LabelOffset(name, d) => write!(f, "{name}{}", signed(*d)),
        }
    }
}

impl TryFrom<String> for Position {
    type Error = ParsePositionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Position> for String {
    fn from(position: Position) -> Self {
        position.to_string()
    }
}

/// One animation call against a batch of targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    /// How the states were specified
    pub kind: TweenKind,
    /// Animated targets, in stagger order
    pub targets: Vec<TargetId>,
    /// Explicit start values
    pub start_values: IndexMap<Property, ValueSource>,
    /// Explicit end values
    pub end_values: IndexMap<Property, ValueSource>,
    /// Easing curve
    pub ease: Ease,
    /// Length of each element's transition
    pub duration: f32,
    /// Spread of start times across the batch
    pub stagger: Option<StaggerRule>,
}

impl Tween {
    fn new(kind: TweenKind, targets: impl IntoIterator<Item = TargetId>) -> Self {
        Self {
            kind,
            targets: targets.into_iter().collect(),
            start_values: IndexMap::new(),
            end_values: IndexMap::new(),
            ease: Ease::default(),
            duration: if kind == TweenKind::Set { 0.0 } else { DEFAULT_DURATION },
            stagger: None,
        }
    }

    /// Animate from the current state to the values given with [`Tween::prop`]
    pub fn to(targets: impl IntoIterator<Item = TargetId>) -> Self {
        Self::new(TweenKind::To, targets)
    }

    /// Animate from the values given with [`Tween::prop`] to the current state
    pub fn from(targets: impl IntoIterator<Item = TargetId>) -> Self {
        Self::new(TweenKind::From, targets)
    }

    /// Animate from [`Tween::from_prop`] values to [`Tween::prop`] values
    pub fn from_to(targets: impl IntoIterator<Item = TargetId>) -> Self {
        Self::new(TweenKind::FromTo, targets)
    }

    /// Jump to the values given with [`Tween::prop`]
    pub fn set(targets: impl IntoIterator<Item = TargetId>) -> Self {
        Self::new(TweenKind::Set, targets)
    }

    /// Animate nothing for `duration` seconds
    pub fn hold(duration: f32) -> Self {
        Self::new(TweenKind::To, []).duration(duration)
    }

    /// Set the tween's primary value for `property`
    ///
    /// For `from` tweens this is the start value; for every other kind it is
    /// the end value.
    pub fn prop(mut self, property: Property, value: impl Into<ValueSource>) -> Self {
        let value = value.into();
        match self.kind {
            TweenKind::From => self.start_values.insert(property, value),
            TweenKind::To | TweenKind::FromTo | TweenKind::Set => {
                self.end_values.insert(property, value)
            }
        };
        self
    }

    /// Set an explicit start value for `property`
    pub fn from_prop(mut self, property: Property, value: impl Into<ValueSource>) -> Self {
        self.start_values.insert(property, value.into());
        self
    }

    /// Set the easing curve
    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    /// Set the per-element duration
    pub fn duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    /// Spread start times across the batch
    pub fn stagger(mut self, rule: StaggerRule) -> Self {
        self.stagger = Some(rule);
        self
    }

    /// Properties this tween touches, start values first
    pub fn properties(&self) -> Vec<Property> {
        let mut props: Vec<Property> = self.start_values.keys().copied().collect();
        for prop in self.end_values.keys() {
            if !props.contains(prop) {
                props.push(*prop);
            }
        }
        props
    }

    fn validate(&self) -> SequencerResult<()> {
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(SequencerError::invalid(format!(
                "duration must be finite and non-negative, got {}",
                self.duration
            )));
        }
        if self.kind == TweenKind::Set && self.duration > 0.0 {
            return Err(SequencerError::invalid("set segments have no duration"));
        }
        let has_values = !self.start_values.is_empty() || !self.end_values.is_empty();
        if self.targets.is_empty() && has_values {
            return Err(SequencerError::invalid("values given without targets"));
        }
        for (property, source) in self.start_values.iter().chain(self.end_values.iter()) {
            if !source.is_finite() {
                return Err(SequencerError::invalid(format!(
                    "{property} has a non-finite value source {source:?}"
                )));
            }
            let is_flag = matches!(source, ValueSource::Flag(_));
            if is_flag == property.is_continuous() {
                return Err(SequencerError::invalid(format!(
                    "{property} cannot take value source {source:?}"
                )));
            }
        }
        Ok(())
    }
}

/// Where a planned tween landed
#[derive(Debug, Clone)]
pub struct Placement {
    /// Earliest start of the batch
    pub start: f32,
    /// Latest end of the batch
    pub end: f32,
    /// Planned segments, one per target
    pub segments: Vec<Segment>,
}

/// Turns tweens into segments against the current state of a timeline
pub struct SegmentBuilder<'a> {
    timeline: &'a Timeline,
}

impl<'a> SegmentBuilder<'a> {
    /// Create a builder reading from `timeline`
    pub fn new(timeline: &'a Timeline) -> Self {
        Self { timeline }
    }

    /// Resolve a position to a start time
    pub fn resolve_position(&self, position: &Position) -> SequencerResult<f32> {
        let timeline = self.timeline;
        let previous = timeline.last_insertion();
        let start = match position {
            Position::End => timeline.duration(),
            Position::Absolute(t) => *t,
            Position::Relative(d) => timeline.duration() + d,
            Position::WithPrevious => previous.map_or(0.0, |(start, _)| start),
            Position::AfterPrevious => previous.map_or(0.0, |(_, end)| end),
            Position::Label(name) => timeline.resolve(name)?,
            Position::LabelOffset(name, d) => timeline.resolve(name)? + d,
        };
        if !start.is_finite() {
            return Err(SequencerError::invalid(format!(
                "position {position} resolves to {start}"
            )));
        }
        if start < 0.0 {
            return Err(SequencerError::invalid(format!(
                "position {position} resolves to {start}, before the timeline start"
            )));
        }
        Ok(start)
    }

    /// Plan the segments for `tween` at `position`
    ///
    /// Random value sources draw from `rng`; callers pass a copy and keep it
    /// only if planning succeeds.
    pub fn plan(
        &self,
        tween: &Tween,
        position: &Position,
        rng: &mut Rng64,
    ) -> SequencerResult<Placement> {
        tween.validate()?;

        let mut targets: Vec<TargetId> = Vec::with_capacity(tween.targets.len());
        for target in &tween.targets {
            if self.timeline.target(*target).is_none() {
                return Err(SequencerError::UnknownTarget(*target));
            }
            if !targets.contains(target) {
                targets.push(*target);
            }
        }

        let offsets = match &tween.stagger {
            Some(_) if targets.is_empty() => {
                return Err(SequencerError::invalid("stagger needs at least one target"));
            }
            Some(rule) => rule.offsets(targets.len())?,
            None => vec![0.0; targets.len()],
        };

        let base = self.resolve_position(position)?;
        let properties = tween.properties();
        let mut previous_start = self.timeline.segments().last().map(|s| s.start);
        let mut segments = Vec::with_capacity(targets.len());

        for (index, (target, offset)) in targets.iter().zip(offsets).enumerate() {
            let start = base + offset;
            let mut from = PropertySet::new();
            let mut to = PropertySet::new();

            for property in &properties {
                let current = || self.timeline.value_at(*target, *property, start);
                let start_value = match tween.start_values.get(property) {
                    Some(source) => source.resolve(index, rng),
                    None => current(),
                };
                let end_value: PropertyValue = match tween.end_values.get(property) {
                    Some(source) => source.resolve(index, rng),
                    None => current(),
                };
                from.set(*property, start_value);
                to.set(*property, end_value);
            }

            let parallel = previous_start.is_some_and(|prev| start < prev);
            previous_start = Some(start);

            segments.push(Segment {
                id: SegmentId::new(),
                target: *target,
                kind: tween.kind,
                from,
                to,
                ease: tween.ease,
                start,
                duration: tween.duration,
                batch_index: index,
                parallel,
            });
        }

        // Target-less holds still occupy their duration.
        let floor = if segments.is_empty() {
            base + tween.duration
        } else {
            base
        };
        let start = segments.iter().map(|s| s.start).fold(base, f32::min);
        let end = segments.iter().map(Segment::end).fold(floor, f32::max);

        Ok(Placement {
            start,
            end,
            segments,
        })
    }
}
