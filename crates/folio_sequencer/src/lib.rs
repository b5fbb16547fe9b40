// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scroll-synchronized timeline sequencer.
//!
//! This crate composes scene animations onto one master timeline and drives
//! its play-head from scroll position or label seeks:
//! - Label index for named timeline positions
//! - Segment builder with positions, staggers and eases
//! - Progress driver state machine
//! - Trigger binder for scroll and frame input
//!
//! ## Architecture
//!
//! Visual state is a pure function of the play-head:
//! - Tweens are resolved to segments with fixed values when appended
//! - Only the driver moves the play-head
//! - Snapshots sample every target at the play-head

pub mod builder;
pub mod driver;
pub mod ease;
pub mod error;
pub mod label;
pub mod property;
pub mod segment;
pub mod snapshot;
pub mod stagger;
pub mod target;
pub mod timeline;
pub mod trigger;
pub mod value;
pub mod zone;

pub use builder::{ParsePositionError, Placement, Position, SegmentBuilder, Tween, DEFAULT_DURATION};
pub use driver::{DriverConfig, DriverEvent, DriverState, ProgressDriver, ScrubMode};
pub use ease::{Ease, EaseDirection, ParseEaseError};
pub use error::{SequencerError, SequencerResult};
pub use label::{Label, LabelIndex};
pub use property::{Property, PropertySet, PropertyValue};
pub use segment::{Segment, SegmentId, SegmentTiming, TweenKind};
pub use snapshot::{Snapshot, TargetState};
pub use stagger::{StaggerFrom, StaggerRule, StaggerSpacing};
pub use target::{Target, TargetId};
pub use timeline::{Timeline, TimelineId};
pub use trigger::{BindingId, ProgressSource, ScrollRange, SourceEvent, SyntheticCounter, TriggerBinder};
pub use value::{Rng64, ValueSource};
pub use zone::{Zone, ZoneEvent, ZoneEventKind};
