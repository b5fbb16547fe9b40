// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline containing segments, labels and the play-head.

use crate::builder::{Position, SegmentBuilder, Tween};
use crate::error::{SequencerError, SequencerResult};
use crate::label::{Label, LabelIndex};
use crate::property::{Property, PropertySet, PropertyValue};
use crate::segment::{Segment, SegmentId, SegmentTiming};
use crate::snapshot::{Snapshot, TargetState};
use crate::target::{Target, TargetId};
use crate::value::Rng64;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Seed used by [`Timeline::new`]
pub const DEFAULT_SEED: u64 = 0x5EED_F011_0000_0001;

/// Unique identifier for a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineId(pub Uuid);

impl TimelineId {
    /// Create a new random timeline ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimelineId {
    fn default() -> Self {
        Self::new()
    }
}

/// Segments and animated properties of one target
#[derive(Debug, Clone, Default)]
struct TargetTrack {
    /// Indices into the timeline's segment list, in append order
    segments: Vec<usize>,
    /// Properties written by any segment, in first-write order
    properties: Vec<Property>,
}

/// A master timeline
///
/// Created once per mounted view. The Segment Builder appends to it, the
/// driver moves its play-head, and everything visual is derived from the
/// play-head through [`Timeline::sample`].
#[derive(Debug, Clone)]
pub struct Timeline {
    /// Unique timeline ID
    pub id: TimelineId,
    /// Timeline name
    pub name: String,
    targets: IndexMap<TargetId, Target>,
    tracks: IndexMap<TargetId, TargetTrack>,
    segments: Vec<Segment>,
    labels: LabelIndex,
    duration: f32,
    playhead: f32,
    last_insertion: Option<(f32, f32)>,
    rng: Rng64,
}

impl Timeline {
    /// Create an empty timeline
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_seed(name, DEFAULT_SEED)
    }

    /// Create an empty timeline whose random value sources use `seed`
    pub fn with_seed(name: impl Into<String>, seed: u64) -> Self {
        Self {
            id: TimelineId::new(),
            name: name.into(),
            targets: IndexMap::new(),
            tracks: IndexMap::new(),
            segments: Vec::new(),
            labels: LabelIndex::new(),
            duration: 0.0,
            playhead: 0.0,
            last_insertion: None,
            rng: Rng64::new(seed),
        }
    }

    /// Register a target
    pub fn add_target(&mut self, target: Target) -> TargetId {
        let id = target.id;
        self.targets.insert(id, target);
        id
    }

    /// Register several targets, returning their IDs in order
    pub fn add_targets(&mut self, targets: impl IntoIterator<Item = Target>) -> Vec<TargetId> {
        targets.into_iter().map(|t| self.add_target(t)).collect()
    }

    /// Get a target
    pub fn target(&self, id: TargetId) -> Option<&Target> {
        self.targets.get(&id)
    }

    /// Get all targets in registration order
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    /// Append a tween at `position`
    ///
    /// Returns the IDs of the created segments, one per distinct target. On
    /// error the timeline is unchanged.
    pub fn append(&mut self, tween: Tween, position: Position) -> SequencerResult<Vec<SegmentId>> {
        let mut rng = self.rng;
        let placement = SegmentBuilder::new(self).plan(&tween, &position, &mut rng)?;
        self.rng = rng;

        tracing::trace!(
            timeline = %self.name,
            kind = tween.kind.name(),
            start = placement.start,
            end = placement.end,
            segments = placement.segments.len(),
            "Appended tween"
        );

        let mut ids = Vec::with_capacity(placement.segments.len());
        for segment in placement.segments {
            let track = self.tracks.entry(segment.target).or_default();
            for property in segment.to.properties() {
                if !track.properties.contains(&property) {
                    track.properties.push(property);
                }
            }
            track.segments.push(self.segments.len());
            ids.push(segment.id);
            self.segments.push(segment);
        }

        self.duration = self.duration.max(placement.end);
        self.last_insertion = Some((placement.start, placement.end));
        Ok(ids)
    }

    /// Append a tween at the end of the timeline
    pub fn then(&mut self, tween: Tween) -> SequencerResult<Vec<SegmentId>> {
        self.append(tween, Position::End)
    }

    /// Add a label at an absolute position
    ///
    /// The position must lie within `[0, duration]`.
    pub fn add_label(&mut self, name: impl Into<String>, position: f32) -> SequencerResult<()> {
        let name = name.into();
        if !position.is_finite() || position < 0.0 || position > self.duration {
            return Err(SequencerError::LabelOutOfRange {
                name,
                position,
                duration: self.duration,
            });
        }
        self.labels.add_label(name, position)
    }

    /// Add a label at a position expressed like a tween position
    pub fn add_label_at(&mut self, name: impl Into<String>, position: &Position) -> SequencerResult<f32> {
        let time = SegmentBuilder::new(self).resolve_position(position)?;
        self.add_label(name, time)?;
        Ok(time)
    }

    /// Look up a label's position
    pub fn resolve(&self, name: &str) -> SequencerResult<f32> {
        self.labels.resolve(name)
    }

    /// Get the label index
    pub fn labels(&self) -> &LabelIndex {
        &self.labels
    }

    /// Labels sorted by position
    pub fn ordered_labels(&self) -> Vec<Label> {
        self.labels.ordered()
    }

    /// Total duration in timeline seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Current play-head position
    pub fn playhead(&self) -> f32 {
        self.playhead
    }

    /// Current play-head as a fraction of the duration
    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            self.playhead / self.duration
        } else {
            0.0
        }
    }

    /// Play-head position for a progress fraction
    pub fn time_for_progress(&self, progress: f32) -> f32 {
        progress.clamp(0.0, 1.0) * self.duration
    }

    /// Move the play-head, clamped to `[0, duration]`; returns the old position
    pub(crate) fn set_playhead(&mut self, time: f32) -> f32 {
        let previous = self.playhead;
        self.playhead = time.clamp(0.0, self.duration);
        previous
    }

    /// Start and end of the most recent insertion
    pub fn last_insertion(&self) -> Option<(f32, f32)> {
        self.last_insertion
    }

    /// All segments in append order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segments animating `target`, in append order
    pub fn segments_for(&self, target: TargetId) -> impl Iterator<Item = &Segment> {
        self.tracks
            .get(&target)
            .map(|track| track.segments.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|idx| &self.segments[*idx])
    }

    /// Start and end of every segment, in append order
    pub fn timing_table(&self) -> Vec<SegmentTiming> {
        self.segments.iter().map(SegmentTiming::from).collect()
    }

    /// Value of one property of one target at `time`
    ///
    /// The latest-starting segment that has begun wins (later appends win
    /// ties). Before any writer has begun, the earliest pending segment with
    /// an explicit from-state shows that state; otherwise the target's
    /// resting value applies.
    pub fn value_at(&self, target: TargetId, property: Property, time: f32) -> PropertyValue {
        let resting = self
            .targets
            .get(&target)
            .map_or_else(|| property.default_value(), |t| t.initial.resolve(property));

        let mut governing: Option<&Segment> = None;
        let mut pending: Option<&Segment> = None;
        for segment in self.segments_for(target).filter(|s| s.writes(property)) {
            if segment.start <= time {
                if governing.map_or(true, |g| segment.start >= g.start) {
                    governing = Some(segment);
                }
            } else if segment.kind.renders_immediately()
                && pending.map_or(true, |p| segment.start < p.start)
            {
                pending = Some(segment);
            }
        }

        governing
            .and_then(|s| s.value_at(property, time))
            .or_else(|| pending.and_then(|s| s.pending_value(property)))
            .unwrap_or(resting)
    }

    /// Visual state of every target at `time`
    pub fn sample(&self, time: f32) -> Snapshot {
        let time = time.clamp(0.0, self.duration);
        let targets = self
            .targets
            .values()
            .map(|target| {
                let mut properties = PropertySet::new();
                let animated = self
                    .tracks
                    .get(&target.id)
                    .map(|t| t.properties.as_slice())
                    .unwrap_or_default();
                for property in target.initial.properties().chain(animated.iter().copied()) {
                    if !properties.contains(property) {
                        properties.set(property, self.value_at(target.id, property, time));
                    }
                }
                TargetState {
                    id: target.id,
                    name: target.name.clone(),
                    properties,
                }
            })
            .collect();

        Snapshot {
            time,
            progress: if self.duration > 0.0 { time / self.duration } else { 0.0 },
            targets,
        }
    }

    /// Visual state at the current play-head
    pub fn snapshot(&self) -> Snapshot {
        self.sample(self.playhead)
    }
}
