// SPDX-License-Identifier: MIT OR Apache-2.0
//! Named play-head ranges that report when the play-head crosses them.

use crate::error::{SequencerError, SequencerResult};
use serde::{Deserialize, Serialize};

/// A named range of the timeline, active for `start <= t < end`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    /// Zone name
    pub name: String,
    /// Start in timeline seconds
    pub start: f32,
    /// End in timeline seconds
    pub end: f32,
}

impl Zone {
    /// Create a zone
    pub fn new(name: impl Into<String>, start: f32, end: f32) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    /// Check that the bounds are finite and ordered
    pub fn validate(&self) -> SequencerResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() || self.start < 0.0 {
            return Err(SequencerError::invalid(format!(
                "zone {} has invalid bounds {}..{}",
                self.name, self.start, self.end
            )));
        }
        if self.end <= self.start {
            return Err(SequencerError::invalid(format!(
                "zone {} ends at {} before it starts at {}",
                self.name, self.end, self.start
            )));
        }
        Ok(())
    }

    /// Whether the zone is active at `time`
    pub fn contains(&self, time: f32) -> bool {
        time >= self.start && time < self.end
    }
}

/// Kind of zone crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneEventKind {
    /// Crossed the start moving forward
    Enter,
    /// Crossed the end moving forward
    Leave,
    /// Crossed the end moving backward
    EnterBack,
    /// Crossed the start moving backward
    LeaveBack,
}

impl ZoneEventKind {
    /// Leaving sorts before entering at the same boundary
    fn rank(self) -> u8 {
        match self {
            ZoneEventKind::Leave | ZoneEventKind::LeaveBack => 0,
            ZoneEventKind::Enter | ZoneEventKind::EnterBack => 1,
        }
    }
}

/// A zone boundary crossing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneEvent {
    /// Zone name
    pub zone: String,
    /// Crossing kind
    pub kind: ZoneEventKind,
    /// Position of the crossed boundary
    pub position: f32,
}

/// Boundary crossings between two play-head positions
///
/// Events are ordered by where the crossing happens along the direction of
/// travel, so a move that jumps over a whole zone reports both of its
/// boundaries. On a boundary shared by two zones the zone being left is
/// reported before the zone being entered.
pub fn crossings(zones: &[Zone], previous: f32, next: f32) -> Vec<ZoneEvent> {
    let mut events = Vec::new();
    if next > previous {
        for zone in zones {
            if previous < zone.start && next >= zone.start {
                events.push(event(zone, ZoneEventKind::Enter, zone.start));
            }
            if previous < zone.end && next >= zone.end {
                events.push(event(zone, ZoneEventKind::Leave, zone.end));
            }
        }
        events.sort_by(|a, b| {
            a.position
                .total_cmp(&b.position)
                .then(a.kind.rank().cmp(&b.kind.rank()))
        });
    } else if next < previous {
        for zone in zones {
            if previous >= zone.end && next < zone.end {
                events.push(event(zone, ZoneEventKind::EnterBack, zone.end));
            }
            if previous >= zone.start && next < zone.start {
                events.push(event(zone, ZoneEventKind::LeaveBack, zone.start));
            }
        }
        events.sort_by(|a, b| {
            b.position
                .total_cmp(&a.position)
                .then(a.kind.rank().cmp(&b.kind.rank()))
        });
    }
    events
}

/// Enter events for zones already active at `time`
pub fn entered_at(zones: &[Zone], time: f32) -> Vec<ZoneEvent> {
    zones
        .iter()
        .filter(|zone| zone.contains(time))
        .map(|zone| event(zone, ZoneEventKind::Enter, zone.start))
        .collect()
}

fn event(zone: &Zone, kind: ZoneEventKind, position: f32) -> ZoneEvent {
    ZoneEvent {
        zone: zone.name.clone(),
        kind,
        position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<Zone> {
        vec![
            Zone::new("welcome", 1.0, 3.0),
            Zone::new("about", 3.0, 5.0),
        ]
    }

    fn kinds(events: &[ZoneEvent]) -> Vec<(&str, ZoneEventKind)> {
        events.iter().map(|e| (e.zone.as_str(), e.kind)).collect()
    }

    #[test]
    fn test_forward_crossings_in_order() {
        let events = crossings(&sections(), 0.0, 4.0);
        assert_eq!(
            kinds(&events),
            vec![
                ("welcome", ZoneEventKind::Enter),
                ("welcome", ZoneEventKind::Leave),
                ("about", ZoneEventKind::Enter),
            ]
        );
    }

    #[test]
    fn test_backward_crossings_in_order() {
        let events = crossings(&sections(), 6.0, 2.0);
        assert_eq!(
            kinds(&events),
            vec![
                ("about", ZoneEventKind::EnterBack),
                ("about", ZoneEventKind::LeaveBack),
                ("welcome", ZoneEventKind::EnterBack),
            ]
        );
    }

    #[test]
    fn test_shared_boundary_leaves_before_entering() {
        let backward = crossings(&sections(), 4.0, 2.0);
        assert_eq!(
            kinds(&backward),
            vec![
                ("about", ZoneEventKind::LeaveBack),
                ("welcome", ZoneEventKind::EnterBack),
            ]
        );

        let reversed: Vec<Zone> = sections().into_iter().rev().collect();
        let forward = crossings(&reversed, 2.0, 4.0);
        assert_eq!(
            kinds(&forward),
            vec![
                ("welcome", ZoneEventKind::Leave),
                ("about", ZoneEventKind::Enter),
            ]
        );
    }

    #[test]
    fn test_no_crossing_inside_zone() {
        assert!(crossings(&sections(), 1.5, 2.5).is_empty());
        assert!(crossings(&sections(), 2.0, 2.0).is_empty());
    }

    #[test]
    fn test_entered_at() {
        let events = entered_at(&sections(), 3.0);
        assert_eq!(kinds(&events), vec![("about", ZoneEventKind::Enter)]);
    }

    #[test]
    fn test_invalid_bounds() {
        assert!(Zone::new("empty", 2.0, 2.0).validate().is_err());
        assert!(Zone::new("nan", f32::NAN, 2.0).validate().is_err());
        assert!(Zone::new("ok", 0.0, 2.0).validate().is_ok());
    }
}
