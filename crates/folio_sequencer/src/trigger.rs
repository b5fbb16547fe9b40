// SPDX-License-Identifier: MIT OR Apache-2.0
//! Binding of input sources to a progress driver.

use crate::driver::{DriverEvent, ProgressDriver};
use crate::error::{SequencerError, SequencerResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw input delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SourceEvent {
    /// The viewport scrolled to `offset` scroll units
    Scroll {
        /// Absolute scroll offset
        offset: f32,
    },
    /// A frame elapsed
    Frame {
        /// Wall-clock seconds since the previous frame
        dt: f32,
    },
}

/// Translates raw input into progress
pub trait ProgressSource: fmt::Debug {
    /// Progress in `[0, 1]` produced by `event`, if the event moves it
    fn on_event(&mut self, event: &SourceEvent) -> Option<f32>;
}

/// Scroll range mapped linearly onto progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollRange {
    /// Offset at which progress is 0
    pub start: f32,
    /// Scroll distance over which progress reaches 1
    pub length: f32,
}

impl ScrollRange {
    /// Create a scroll range
    pub fn new(start: f32, length: f32) -> Self {
        Self { start, length }
    }

    /// Progress at a scroll offset, clamped to `[0, 1]`
    pub fn progress(&self, offset: f32) -> f32 {
        if self.length <= 0.0 {
            return if offset >= self.start { 1.0 } else { 0.0 };
        }
        ((offset - self.start) / self.length).clamp(0.0, 1.0)
    }
}

impl ProgressSource for ScrollRange {
    fn on_event(&mut self, event: &SourceEvent) -> Option<f32> {
        match *event {
            SourceEvent::Scroll { offset } if offset.is_finite() => Some(self.progress(offset)),
            SourceEvent::Scroll { .. } | SourceEvent::Frame { .. } => None,
        }
    }
}

/// Counter running from 0 to `target` over a fixed wall-clock duration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticCounter {
    /// Final counter value
    pub target: f32,
    /// Seconds to reach the final value
    pub duration: f32,
    elapsed: f32,
}

impl SyntheticCounter {
    /// Create a counter at 0
    pub fn new(target: f32, duration: f32) -> Self {
        Self {
            target,
            duration,
            elapsed: 0.0,
        }
    }

    /// Fraction of the run completed
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Current counter value, rounded down
    pub fn value(&self) -> u32 {
        (self.target * self.progress()).floor().max(0.0) as u32
    }

    /// Whether the counter reached its target
    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Advance by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
    }
}

impl ProgressSource for SyntheticCounter {
    fn on_event(&mut self, event: &SourceEvent) -> Option<f32> {
        match *event {
            SourceEvent::Frame { dt } => {
                self.advance(dt);
                Some(self.progress())
            }
            SourceEvent::Scroll { .. } => None,
        }
    }
}

/// Identifier of one source binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindingId(pub u64);

#[derive(Debug)]
struct Binding {
    id: BindingId,
    source: Box<dyn ProgressSource>,
    /// Progress last handed to the driver
    delivered: Option<f32>,
}

/// Owns a driver and the single source feeding it
///
/// Binding a new source replaces the old one. Progress equal to what the
/// source last delivered is not re-applied, so a source that reports on every
/// frame does not interrupt seeks. After [`TriggerBinder::teardown`] no input
/// reaches the driver again.
#[derive(Debug)]
pub struct TriggerBinder {
    driver: ProgressDriver,
    binding: Option<Binding>,
    next_binding: u64,
}

impl TriggerBinder {
    /// Wrap a driver
    pub fn new(driver: ProgressDriver) -> Self {
        Self {
            driver,
            binding: None,
            next_binding: 1,
        }
    }

    /// Feed the driver from `source`, replacing any previous source
    pub fn bind(&mut self, source: impl ProgressSource + 'static) -> SequencerResult<BindingId> {
        self.driver.bind()?;
        let id = BindingId(self.next_binding);
        self.next_binding += 1;
        let binding = Binding {
            id,
            source: Box::new(source),
            delivered: None,
        };
        if let Some(old) = self.binding.replace(binding) {
            tracing::debug!(old = old.id.0, new = id.0, "Replaced progress source");
        } else {
            tracing::debug!(binding = id.0, "Bound progress source");
        }
        Ok(id)
    }

    /// Deliver one input event
    ///
    /// Returns whether the event changed the scroll progress. Events arriving
    /// without a binding are dropped.
    pub fn dispatch(&mut self, event: &SourceEvent) -> SequencerResult<bool> {
        let Some(binding) = self.binding.as_mut() else {
            tracing::trace!(?event, "No binding, dropping event");
            return Ok(false);
        };

        let applied = match binding.source.on_event(event) {
            Some(progress) if binding.delivered != Some(progress) => {
                let applied = self.driver.scrub(progress)?;
                if applied {
                    binding.delivered = Some(progress);
                }
                applied
            }
            Some(_) | None => false,
        };
        if let SourceEvent::Frame { dt } = *event {
            self.driver.tick(dt);
        }
        Ok(applied)
    }

    /// Seek to a label
    pub fn go_to(&mut self, label: &str) -> SequencerResult<()> {
        self.ensure_bound()?;
        self.driver.go_to(label)
    }

    /// Seek to the next label, wrapping around
    pub fn go_to_next(&mut self) -> SequencerResult<Option<String>> {
        self.ensure_bound()?;
        self.driver.go_to_next()
    }

    /// Seek to the previous label, wrapping around
    pub fn go_to_previous(&mut self) -> SequencerResult<Option<String>> {
        self.ensure_bound()?;
        self.driver.go_to_previous()
    }

    /// Release the source and unbind the driver
    ///
    /// Returns `false` if already torn down.
    pub fn teardown(&mut self) -> bool {
        if let Some(binding) = self.binding.take() {
            tracing::debug!(binding = binding.id.0, "Released progress source");
        }
        self.driver.unbind()
    }

    /// Current binding, if any
    pub fn binding(&self) -> Option<BindingId> {
        self.binding.as_ref().map(|binding| binding.id)
    }

    /// Whether a source is bound
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Driven driver
    pub fn driver(&self) -> &ProgressDriver {
        &self.driver
    }

    /// Get pending driver events and clear them
    pub fn take_events(&mut self) -> Vec<DriverEvent> {
        self.driver.take_events()
    }

    fn ensure_bound(&self) -> SequencerResult<()> {
        if self.binding.is_none() {
            return Err(SequencerError::DriverUnbound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Tween;
    use crate::driver::{DriverConfig, DriverState};
    use crate::property::Property;
    use crate::target::Target;
    use crate::timeline::Timeline;

    fn binder() -> TriggerBinder {
        let mut timeline = Timeline::new("trigger");
        let id = timeline.add_target(Target::new("box"));
        timeline
            .then(Tween::to([id]).prop(Property::X, 100.0).duration(10.0))
            .unwrap();
        timeline.add_label("start", 0.0).unwrap();
        timeline.add_label("end", 10.0).unwrap();
        TriggerBinder::new(ProgressDriver::new(timeline, DriverConfig::default()))
    }

    #[test]
    fn test_scroll_range_clamps() {
        let range = ScrollRange::new(100.0, 1000.0);
        assert_eq!(range.progress(0.0), 0.0);
        assert_eq!(range.progress(600.0), 0.5);
        assert_eq!(range.progress(5000.0), 1.0);
        assert_eq!(ScrollRange::new(10.0, 0.0).progress(10.0), 1.0);
    }

    #[test]
    fn test_synthetic_counter() {
        let mut counter = SyntheticCounter::new(100.0, 2.0);
        assert_eq!(counter.value(), 0);
        assert_eq!(counter.on_event(&SourceEvent::Frame { dt: 0.5 }), Some(0.25));
        assert_eq!(counter.value(), 25);
        assert_eq!(counter.on_event(&SourceEvent::Scroll { offset: 9.0 }), None);
        counter.advance(5.0);
        assert!(counter.is_finished());
        assert_eq!(counter.value(), 100);
    }

    #[test]
    fn test_dispatch_scrolls_driver() {
        let mut binder = binder();
        binder.bind(ScrollRange::new(0.0, 1000.0)).unwrap();
        assert!(binder.dispatch(&SourceEvent::Scroll { offset: 250.0 }).unwrap());
        assert_eq!(binder.driver().playhead(), 2.5);
        assert!(!binder.dispatch(&SourceEvent::Frame { dt: 0.016 }).unwrap());
        assert_eq!(binder.driver().playhead(), 2.5);
    }

    #[test]
    fn test_rebinding_replaces_source() {
        let mut binder = binder();
        let first = binder.bind(ScrollRange::new(0.0, 1000.0)).unwrap();
        let second = binder.bind(ScrollRange::new(0.0, 100.0)).unwrap();
        assert_ne!(first, second);
        assert_eq!(binder.binding(), Some(second));
        binder.dispatch(&SourceEvent::Scroll { offset: 50.0 }).unwrap();
        assert_eq!(binder.driver().playhead(), 5.0);
    }

    #[test]
    fn test_frames_advance_seeks() {
        let mut binder = binder();
        binder.bind(ScrollRange::new(0.0, 1000.0)).unwrap();
        binder.go_to("end").unwrap();
        for _ in 0..12 {
            binder.dispatch(&SourceEvent::Frame { dt: 0.1 }).unwrap();
        }
        assert_eq!(binder.driver().playhead(), 10.0);
        assert_eq!(binder.driver().state(), DriverState::Bound);
    }

    #[test]
    fn test_teardown_stops_delivery() {
        let mut binder = binder();
        binder.bind(ScrollRange::new(0.0, 1000.0)).unwrap();
        binder.dispatch(&SourceEvent::Scroll { offset: 500.0 }).unwrap();
        assert!(binder.teardown());
        assert!(!binder.teardown());
        assert!(!binder.dispatch(&SourceEvent::Scroll { offset: 900.0 }).unwrap());
        assert_eq!(binder.driver().playhead(), 5.0);
        assert_eq!(binder.go_to("start"), Err(SequencerError::DriverUnbound));
        assert_eq!(
            binder.bind(ScrollRange::new(0.0, 1.0)),
            Err(SequencerError::DriverUnbound)
        );
    }

    #[test]
    fn test_finished_counter_does_not_pin_playhead() {
        let mut binder = binder();
        binder.bind(SyntheticCounter::new(100.0, 0.1)).unwrap();
        let applied: Vec<bool> = (0..3)
            .map(|_| binder.dispatch(&SourceEvent::Frame { dt: 0.1 }).unwrap())
            .collect();
        assert_eq!(applied, vec![true, false, false]);
        assert_eq!(binder.driver().playhead(), 10.0);

        binder.go_to("start").unwrap();
        for _ in 0..30 {
            assert!(!binder.dispatch(&SourceEvent::Frame { dt: 0.1 }).unwrap());
        }
        assert_eq!(binder.driver().playhead(), 0.0);
        assert_eq!(binder.driver().state(), DriverState::Bound);
        assert!(binder
            .take_events()
            .contains(&DriverEvent::SeekCompleted { label: "start".into() }));
    }

    #[test]
    fn test_repeated_scroll_offset_is_not_reapplied() {
        let mut binder = binder();
        binder.bind(ScrollRange::new(0.0, 1000.0)).unwrap();
        assert!(binder.dispatch(&SourceEvent::Scroll { offset: 400.0 }).unwrap());
        assert!(!binder.dispatch(&SourceEvent::Scroll { offset: 400.0 }).unwrap());
        assert!(binder.dispatch(&SourceEvent::Scroll { offset: 300.0 }).unwrap());
        assert_eq!(binder.driver().playhead(), 3.0);
    }

    #[test]
    fn test_counter_drives_timeline() {
        let mut binder = binder();
        binder.bind(SyntheticCounter::new(100.0, 1.0)).unwrap();
        for _ in 0..4 {
            binder.dispatch(&SourceEvent::Frame { dt: 0.25 }).unwrap();
        }
        assert_eq!(binder.driver().percent(), 100);
    }
}
