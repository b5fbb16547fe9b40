// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scroll/progress driver.
//!
//! The driver is the only writer of a timeline's play-head. It maps external
//! progress onto the play-head either continuously (scrubbing) or through
//! animated seeks between labels, and reports seek lifecycle and zone
//! crossings through an event queue drained with [`ProgressDriver::take_events`].
//!
//! ```text
//! Idle -> Bound -> (Scrubbing | Seeking) -> Bound -> Unbound
//! ```

use crate::ease::Ease;
use crate::error::{SequencerError, SequencerResult};
use crate::label::{Label, POSITION_EPSILON};
use crate::property::lerp;
use crate::snapshot::Snapshot;
use crate::timeline::Timeline;
use crate::zone::{self, Zone, ZoneEvent};
use serde::{Deserialize, Serialize};

/// Smoothed scrubbing closes all but `e^-5` of the gap within one lag
const SCRUB_CATCH_UP: f32 = 5.0;

/// Driver lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverState {
    /// Created, not yet observing anything
    Idle,
    /// Observing, play-head at rest
    Bound,
    /// Play-head follows scroll progress
    Scrubbing,
    /// Play-head is animating towards a label
    Seeking,
    /// Torn down; terminal
    Unbound,
}

/// How scrubbing moves the play-head
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ScrubMode {
    /// Play-head jumps to the scrolled position
    #[default]
    Immediate,
    /// Play-head catches up with the scrolled position over `lag` seconds
    Smoothed {
        /// Catch-up time in seconds
        lag: f32,
    },
}

/// Driver tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Scrub behaviour
    pub scrub: ScrubMode,
    /// Wall-clock length of a label seek in seconds
    pub seek_duration: f32,
    /// Easing of label seeks
    pub seek_ease: Ease,
}

impl DriverConfig {
    /// Replace unusable tuning with working values
    ///
    /// A smoothed scrub without a finite positive lag scrubs immediately, and
    /// a non-finite or negative seek duration makes seeks jump.
    pub fn sanitized(self) -> Self {
        let scrub = match self.scrub {
            ScrubMode::Smoothed { lag } if !lag.is_finite() || lag <= 0.0 => {
                if lag != 0.0 {
                    tracing::warn!(lag, "Unusable scrub lag, scrubbing immediately");
                }
                ScrubMode::Immediate
            }
            scrub => scrub,
        };
        let seek_duration = if self.seek_duration.is_finite() && self.seek_duration >= 0.0 {
            self.seek_duration
        } else {
            tracing::warn!(seek_duration = self.seek_duration, "Unusable seek duration, seeks will jump");
            0.0
        };
        Self {
            scrub,
            seek_duration,
            seek_ease: self.seek_ease,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            scrub: ScrubMode::Immediate,
            seek_duration: 1.0,
            seek_ease: Ease::power_in_out(2),
        }
    }
}

/// Something the driver did that observers may care about
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DriverEvent {
    /// A seek towards `label` began
    SeekStarted {
        /// Destination label
        label: String,
        /// Play-head when the seek began
        from: f32,
        /// Destination position
        to: f32,
    },
    /// The seek towards `label` reached its destination
    SeekCompleted {
        /// Destination label
        label: String,
    },
    /// The seek towards `label` was superseded by newer input
    SeekCancelled {
        /// Destination label
        label: String,
    },
    /// The play-head crossed a zone boundary
    Zone(ZoneEvent),
}

#[derive(Debug, Clone)]
struct SeekTween {
    label: String,
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
    ease: Ease,
}

impl SeekTween {
    fn position(&self) -> f32 {
        if self.elapsed >= self.duration {
            return self.to;
        }
        lerp(self.from, self.to, self.ease.apply(self.elapsed / self.duration))
    }
}

/// Drives a timeline's play-head from progress input
#[derive(Debug, Clone)]
pub struct ProgressDriver {
    timeline: Timeline,
    config: DriverConfig,
    state: DriverState,
    seek: Option<SeekTween>,
    scrub_target: Option<f32>,
    zones: Vec<Zone>,
    pending_events: Vec<DriverEvent>,
}

impl ProgressDriver {
    /// Create a driver owning `timeline`
    ///
    /// Unusable tuning is replaced, see [`DriverConfig::sanitized`].
    pub fn new(timeline: Timeline, config: DriverConfig) -> Self {
        Self {
            timeline,
            config: config.sanitized(),
            state: DriverState::Idle,
            seek: None,
            scrub_target: None,
            zones: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    /// Start observing input
    ///
    /// Reports `Enter` for every zone that already contains the play-head.
    /// Binding an already bound driver does nothing.
    pub fn bind(&mut self) -> SequencerResult<()> {
        match self.state {
            DriverState::Unbound => Err(SequencerError::DriverUnbound),
            DriverState::Idle => {
                self.state = DriverState::Bound;
                tracing::debug!(timeline = %self.timeline.name, "Driver bound");
                let entered = zone::entered_at(&self.zones, self.timeline.playhead());
                self.pending_events
                    .extend(entered.into_iter().map(DriverEvent::Zone));
                Ok(())
            }
            DriverState::Bound | DriverState::Scrubbing | DriverState::Seeking => Ok(()),
        }
    }

    /// Map scroll progress onto the play-head
    ///
    /// Cancels any in-flight seek. Returns whether the input was applied;
    /// input reaching an unbound driver is ignored.
    pub fn scrub(&mut self, progress: f32) -> SequencerResult<bool> {
        match self.state {
            DriverState::Idle | DriverState::Unbound => {
                tracing::warn!(state = ?self.state, progress, "Ignoring scroll input");
                return Ok(false);
            }
            DriverState::Bound | DriverState::Scrubbing | DriverState::Seeking => {}
        }
        if !progress.is_finite() {
            tracing::warn!(progress, "Ignoring non-finite scroll progress");
            return Ok(false);
        }

        self.cancel_seek();
        self.state = DriverState::Scrubbing;

        let target = self.timeline.time_for_progress(progress);
        match self.config.scrub {
            ScrubMode::Immediate => {
                self.scrub_target = None;
                self.move_playhead(target);
            }
            ScrubMode::Smoothed { .. } => self.scrub_target = Some(target),
        }
        tracing::trace!(progress, target, "Scrubbed");
        Ok(true)
    }

    /// Seek the play-head to a label
    ///
    /// Replaces any seek already in flight. An unknown label fails without
    /// touching the play-head.
    pub fn go_to(&mut self, label: &str) -> SequencerResult<()> {
        self.ensure_bound()?;
        let to = self.timeline.resolve(label)?;

        self.cancel_seek();
        self.scrub_target = None;

        let from = self.timeline.playhead();
        self.pending_events.push(DriverEvent::SeekStarted {
            label: label.to_string(),
            from,
            to,
        });
        tracing::debug!(label, from, to, "Seeking");

        let seek = SeekTween {
            label: label.to_string(),
            from,
            to,
            elapsed: 0.0,
            duration: self.config.seek_duration,
            ease: self.config.seek_ease,
        };
        if seek.duration <= 0.0 || (to - from).abs() <= POSITION_EPSILON {
            self.finish_seek(seek);
        } else {
            self.seek = Some(seek);
            self.state = DriverState::Seeking;
        }
        Ok(())
    }

    /// Seek to the first label after the current destination, wrapping to the first
    pub fn go_to_next(&mut self) -> SequencerResult<Option<String>> {
        self.ensure_bound()?;
        let labels = self.timeline.labels();
        let reference = self.destination();
        let label = labels.next_after(reference).or_else(|| labels.first());
        self.go_to_adjacent(label)
    }

    /// Seek to the last label before the current destination, wrapping to the last
    pub fn go_to_previous(&mut self) -> SequencerResult<Option<String>> {
        self.ensure_bound()?;
        let labels = self.timeline.labels();
        let reference = self.destination();
        let label = labels.previous_before(reference).or_else(|| labels.last());
        self.go_to_adjacent(label)
    }

    fn go_to_adjacent(&mut self, label: Option<Label>) -> SequencerResult<Option<String>> {
        match label {
            Some(label) => {
                self.go_to(&label.name)?;
                Ok(Some(label.name))
            }
            None => Ok(None),
        }
    }

    /// Advance seeks and smoothed scrubbing by `dt` wall-clock seconds
    pub fn tick(&mut self, dt: f32) {
        if self.state == DriverState::Unbound || !dt.is_finite() || dt < 0.0 {
            return;
        }

        if let Some(mut seek) = self.seek.take() {
            seek.elapsed += dt;
            if seek.elapsed >= seek.duration {
                self.finish_seek(seek);
            } else {
                self.move_playhead(seek.position());
                self.seek = Some(seek);
            }
            return;
        }

        if let (Some(target), ScrubMode::Smoothed { lag }) = (self.scrub_target, self.config.scrub) {
            let current = self.timeline.playhead();
            let step = 1.0 - (-dt * SCRUB_CATCH_UP / lag).exp();
            let next = lerp(current, target, step);
            if (target - next).abs() <= POSITION_EPSILON {
                self.scrub_target = None;
                self.move_playhead(target);
            } else {
                self.move_playhead(next);
            }
        }
    }

    /// Stop observing input
    ///
    /// Any seek in flight is dropped without a completion event. The
    /// play-head stays where it is. Returns `false` if already unbound.
    pub fn unbind(&mut self) -> bool {
        if self.state == DriverState::Unbound {
            return false;
        }
        if let Some(seek) = self.seek.take() {
            tracing::debug!(label = %seek.label, "Seek aborted by teardown");
        }
        self.scrub_target = None;
        self.state = DriverState::Unbound;
        tracing::debug!(timeline = %self.timeline.name, playhead = self.timeline.playhead(), "Driver unbound");
        true
    }

    /// Register a zone
    pub fn add_zone(&mut self, zone: Zone) -> SequencerResult<()> {
        zone.validate()?;
        self.zones.push(zone);
        Ok(())
    }

    /// Register a zone spanning two labels
    pub fn add_zone_between(&mut self, name: impl Into<String>, start: &str, end: &str) -> SequencerResult<()> {
        let start = self.timeline.resolve(start)?;
        let end = self.timeline.resolve(end)?;
        self.add_zone(Zone::new(name, start, end))
    }

    /// Get registered zones
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Get pending events and clear them
    pub fn take_events(&mut self) -> Vec<DriverEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Current state
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Driver configuration
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Driven timeline
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Current play-head
    pub fn playhead(&self) -> f32 {
        self.timeline.playhead()
    }

    /// Current play-head as a fraction of the duration
    pub fn progress(&self) -> f32 {
        self.timeline.progress()
    }

    /// Current progress as a whole percentage
    pub fn percent(&self) -> u32 {
        (self.progress() * 100.0).round().clamp(0.0, 100.0) as u32
    }

    /// Last label at or before the play-head
    pub fn current_label(&self) -> Option<Label> {
        let playhead = self.timeline.playhead();
        self.timeline
            .ordered_labels()
            .into_iter()
            .rev()
            .find(|l| l.position <= playhead + POSITION_EPSILON)
    }

    /// Visual state at the current play-head
    pub fn snapshot(&self) -> Snapshot {
        self.timeline.snapshot()
    }

    fn ensure_bound(&self) -> SequencerResult<()> {
        match self.state {
            DriverState::Idle | DriverState::Unbound => Err(SequencerError::DriverUnbound),
            DriverState::Bound | DriverState::Scrubbing | DriverState::Seeking => Ok(()),
        }
    }

    /// Where the play-head is heading
    fn destination(&self) -> f32 {
        self.seek
            .as_ref()
            .map_or_else(|| self.timeline.playhead(), |seek| seek.to)
    }

    fn cancel_seek(&mut self) {
        if let Some(seek) = self.seek.take() {
            tracing::debug!(label = %seek.label, "Seek cancelled");
            self.pending_events
                .push(DriverEvent::SeekCancelled { label: seek.label });
            self.state = DriverState::Bound;
        }
    }

    fn finish_seek(&mut self, seek: SeekTween) {
        self.move_playhead(seek.to);
        tracing::debug!(label = %seek.label, "Seek completed");
        self.pending_events
            .push(DriverEvent::SeekCompleted { label: seek.label });
        self.state = DriverState::Bound;
    }

    fn move_playhead(&mut self, time: f32) {
        let previous = self.timeline.set_playhead(time);
        let next = self.timeline.playhead();
        let crossed = zone::crossings(&self.zones, previous, next);
        self.pending_events
            .extend(crossed.into_iter().map(DriverEvent::Zone));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Tween;
    use crate::property::Property;
    use crate::target::Target;
    use crate::zone::ZoneEventKind;

    fn timeline() -> Timeline {
        let mut timeline = Timeline::new("driver");
        let id = timeline.add_target(Target::new("box").with_initial(Property::Opacity, 0.0));
        timeline.add_label("a", 0.0).unwrap();
        timeline
            .then(Tween::to([id]).prop(Property::Opacity, 1.0).duration(2.0))
            .unwrap();
        timeline.add_label("b", 2.0).unwrap();
        timeline
            .then(Tween::to([id]).prop(Property::X, 100.0).duration(2.0))
            .unwrap();
        timeline.add_label("c", 4.0).unwrap();
        timeline
    }

    fn bound(config: DriverConfig) -> ProgressDriver {
        let mut driver = ProgressDriver::new(timeline(), config);
        driver.bind().unwrap();
        driver
    }

    #[test]
    fn test_scrub_is_path_independent() {
        let shared = timeline();
        let mut direct = ProgressDriver::new(shared.clone(), DriverConfig::default());
        direct.bind().unwrap();
        direct.scrub(0.3).unwrap();

        let mut wandering = ProgressDriver::new(shared, DriverConfig::default());
        wandering.bind().unwrap();
        wandering.scrub(0.3).unwrap();
        let before = wandering.snapshot();
        wandering.scrub(0.9).unwrap();
        wandering.scrub(0.3).unwrap();

        assert_eq!(direct.playhead(), wandering.playhead());
        assert_eq!(direct.snapshot(), wandering.snapshot());
        assert_eq!(before, wandering.snapshot());
        assert_eq!(wandering.state(), DriverState::Scrubbing);
    }

    #[test]
    fn test_scrub_clamps_progress() {
        let mut driver = bound(DriverConfig::default());
        driver.scrub(1.7).unwrap();
        assert_eq!(driver.playhead(), 4.0);
        assert_eq!(driver.percent(), 100);
        driver.scrub(-1.0).unwrap();
        assert_eq!(driver.playhead(), 0.0);
    }

    #[test]
    fn test_unknown_label_leaves_playhead() {
        let mut driver = bound(DriverConfig::default());
        driver.scrub(0.25).unwrap();
        assert_eq!(
            driver.go_to("nonexistent"),
            Err(SequencerError::UnknownLabel("nonexistent".into()))
        );
        assert_eq!(driver.playhead(), 1.0);
        assert_eq!(driver.state(), DriverState::Scrubbing);
    }

    #[test]
    fn test_seek_animates_and_completes() {
        let mut driver = bound(DriverConfig::default());
        driver.go_to("b").unwrap();
        assert_eq!(driver.state(), DriverState::Seeking);
        driver.tick(0.5);
        let midway = driver.playhead();
        assert!(midway > 0.0 && midway < 2.0);
        driver.tick(0.5);
        assert_eq!(driver.playhead(), 2.0);
        assert_eq!(driver.state(), DriverState::Bound);

        let events = driver.take_events();
        assert_eq!(
            events.last(),
            Some(&DriverEvent::SeekCompleted { label: "b".into() })
        );
        assert!(driver.take_events().is_empty());
    }

    #[test]
    fn test_later_go_to_wins() {
        let mut driver = bound(DriverConfig::default());
        driver.go_to("c").unwrap();
        driver.tick(0.3);
        driver.go_to("b").unwrap();
        for _ in 0..20 {
            driver.tick(0.1);
        }
        assert_eq!(driver.playhead(), 2.0);
        let events = driver.take_events();
        assert!(events.contains(&DriverEvent::SeekCancelled { label: "c".into() }));
        assert!(!events.contains(&DriverEvent::SeekCompleted { label: "c".into() }));
        assert!(events.contains(&DriverEvent::SeekCompleted { label: "b".into() }));
    }

    #[test]
    fn test_scroll_cancels_seek() {
        let mut driver = bound(DriverConfig::default());
        driver.go_to("c").unwrap();
        driver.tick(0.2);
        driver.scrub(0.5).unwrap();
        driver.tick(2.0);
        assert_eq!(driver.playhead(), 2.0);
        assert_eq!(driver.state(), DriverState::Scrubbing);
    }

    #[test]
    fn test_teardown_during_scrub_freezes_playhead() {
        let mut driver = bound(DriverConfig::default());
        driver.scrub(0.5).unwrap();
        assert!(driver.unbind());
        assert!(!driver.unbind());
        assert_eq!(driver.scrub(0.9), Ok(false));
        driver.tick(1.0);
        assert_eq!(driver.playhead(), 2.0);
        assert_eq!(driver.go_to("c"), Err(SequencerError::DriverUnbound));
        assert_eq!(driver.bind(), Err(SequencerError::DriverUnbound));
    }

    #[test]
    fn test_teardown_aborts_seek_silently() {
        let mut driver = bound(DriverConfig::default());
        driver.go_to("c").unwrap();
        driver.tick(0.25);
        let before = driver.playhead();
        driver.take_events();
        driver.unbind();
        driver.tick(5.0);
        assert_eq!(driver.playhead(), before);
        assert!(driver.take_events().is_empty());
    }

    #[test]
    fn test_smoothed_scrub_settles() {
        let config = DriverConfig {
            scrub: ScrubMode::Smoothed { lag: 1.0 },
            ..DriverConfig::default()
        };
        let mut driver = bound(config);
        driver.scrub(1.0).unwrap();
        assert_eq!(driver.playhead(), 0.0);
        driver.tick(0.1);
        assert!(driver.playhead() > 0.0 && driver.playhead() < 4.0);
        for _ in 0..200 {
            driver.tick(1.0 / 60.0);
        }
        assert_eq!(driver.playhead(), 4.0);
    }

    #[test]
    fn test_unusable_lag_scrubs_immediately() {
        for lag in [f32::NAN, f32::INFINITY, -1.0, 0.0] {
            let config = DriverConfig {
                scrub: ScrubMode::Smoothed { lag },
                seek_duration: f32::NAN,
                ..DriverConfig::default()
            };
            let mut driver = bound(config);
            assert_eq!(driver.config().scrub, ScrubMode::Immediate);
            assert_eq!(driver.config().seek_duration, 0.0);

            driver.scrub(0.5).unwrap();
            driver.tick(0.1);
            assert_eq!(driver.playhead(), 2.0);

            driver.go_to("c").unwrap();
            assert_eq!(driver.playhead(), 4.0);
            assert_eq!(driver.state(), DriverState::Bound);
        }
    }

    #[test]
    fn test_label_navigation_wraps() {
        let config = DriverConfig {
            seek_duration: 0.0,
            ..DriverConfig::default()
        };
        let mut driver = bound(config);
        assert_eq!(driver.go_to_next().unwrap().as_deref(), Some("b"));
        assert_eq!(driver.go_to_next().unwrap().as_deref(), Some("c"));
        assert_eq!(driver.go_to_next().unwrap().as_deref(), Some("a"));
        assert_eq!(driver.playhead(), 0.0);
        assert_eq!(driver.go_to_previous().unwrap().as_deref(), Some("c"));
        assert_eq!(driver.current_label().unwrap().name, "c");
    }

    #[test]
    fn test_navigation_follows_seek_destination() {
        let mut driver = bound(DriverConfig::default());
        driver.go_to_next().unwrap();
        driver.tick(0.1);
        assert_eq!(driver.go_to_next().unwrap().as_deref(), Some("c"));
    }

    #[test]
    fn test_zone_events() {
        let mut driver = ProgressDriver::new(timeline(), DriverConfig::default());
        driver.add_zone(Zone::new("intro", 0.0, 1.0)).unwrap();
        driver.add_zone_between("middle", "b", "c").unwrap();
        driver.bind().unwrap();
        driver.scrub(0.75).unwrap();
        driver.scrub(0.0).unwrap();

        let kinds: Vec<_> = driver
            .take_events()
            .into_iter()
            .filter_map(|e| match e {
                DriverEvent::Zone(z) => Some((z.zone, z.kind)),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("intro".to_string(), ZoneEventKind::Enter),
                ("intro".to_string(), ZoneEventKind::Leave),
                ("middle".to_string(), ZoneEventKind::Enter),
                ("middle".to_string(), ZoneEventKind::LeaveBack),
                ("intro".to_string(), ZoneEventKind::EnterBack),
            ]
        );
    }

    #[test]
    fn test_calls_before_bind() {
        let mut driver = ProgressDriver::new(timeline(), DriverConfig::default());
        assert_eq!(driver.state(), DriverState::Idle);
        assert_eq!(driver.scrub(0.5), Ok(false));
        assert_eq!(driver.go_to("b"), Err(SequencerError::DriverUnbound));
        assert_eq!(driver.playhead(), 0.0);
    }
}
