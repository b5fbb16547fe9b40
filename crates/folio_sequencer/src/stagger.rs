// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-element start offsets for batched segments.

use crate::error::{SequencerError, SequencerResult};
use serde::{Deserialize, Serialize};

/// Element the stagger wave starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StaggerFrom {
    /// First element first
    #[default]
    Start,
    /// Last element first
    End,
    /// Middle element(s) first, spreading outwards
    Center,
    /// Both outer elements first, converging on the middle
    Edges,
    /// A specific element first, spreading outwards
    Index(usize),
}

/// Spacing between consecutive elements of the wave
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StaggerSpacing {
    /// Fixed time between neighbouring elements
    Each(f32),
    /// Total time split across the batch
    Amount(f32),
}

/// How start times are spread across a batch of targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaggerRule {
    /// Spacing between elements
    pub spacing: StaggerSpacing,
    /// Wave origin
    #[serde(default)]
    pub from: StaggerFrom,
}

impl StaggerRule {
    /// Fixed step between neighbours, starting at the first element
    pub fn each(step: f32) -> Self {
        Self {
            spacing: StaggerSpacing::Each(step),
            from: StaggerFrom::Start,
        }
    }

    /// Total span split across the batch, starting at the first element
    pub fn amount(total: f32) -> Self {
        Self {
            spacing: StaggerSpacing::Amount(total),
            from: StaggerFrom::Start,
        }
    }

    /// Set the wave origin
    pub fn from(mut self, from: StaggerFrom) -> Self {
        self.from = from;
        self
    }

    /// Check the rule against a batch of `count` elements
    pub fn validate(&self, count: usize) -> SequencerResult<()> {
        let step = match self.spacing {
            StaggerSpacing::Each(v) | StaggerSpacing::Amount(v) => v,
        };
        if !step.is_finite() || step < 0.0 {
            return Err(SequencerError::invalid(format!(
                "stagger spacing must be finite and non-negative, got {step}"
            )));
        }
        if let StaggerFrom::Index(i) = self.from {
            if i >= count {
                return Err(SequencerError::invalid(format!(
                    "stagger origin {i} is outside a batch of {count}"
                )));
            }
        }
        Ok(())
    }

    /// Offset of each element relative to the segment's base offset
    ///
    /// The earliest element is always at offset 0, so the result for `each(s)`
    /// from `Start` is exactly `i * s`.
    pub fn offsets(&self, count: usize) -> SequencerResult<Vec<f32>> {
        self.validate(count)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let distances = self.distances(count);
        let min = distances.iter().copied().fold(f32::INFINITY, f32::min);
        let max = distances.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let range = max - min;

        let step = match self.spacing {
            StaggerSpacing::Each(step) => step,
            StaggerSpacing::Amount(total) if range > 0.0 => total / range,
            StaggerSpacing::Amount(_) => 0.0,
        };

        Ok(distances.into_iter().map(|d| (d - min) * step).collect())
    }

    fn distances(&self, count: usize) -> Vec<f32> {
        let last = (count - 1) as f32;
        let middle = last / 2.0;
        (0..count)
            .map(|i| {
                let i = i as f32;
                match self.from {
                    StaggerFrom::Start => i,
                    StaggerFrom::End => last - i,
                    StaggerFrom::Center => (i - middle).abs(),
                    StaggerFrom::Edges => middle - (i - middle).abs(),
                    StaggerFrom::Index(origin) => (i - origin as f32).abs(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_offsets(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{actual:?} != {expected:?}");
        }
    }

    #[test]
    fn test_each_from_start() {
        let offsets = StaggerRule::each(0.02).offsets(5).unwrap();
        assert_offsets(&offsets, &[0.0, 0.02, 0.04, 0.06, 0.08]);
    }

    #[test]
    fn test_each_from_end_is_reversed() {
        let offsets = StaggerRule::each(0.1).from(StaggerFrom::End).offsets(4).unwrap();
        assert_offsets(&offsets, &[0.3, 0.2, 0.1, 0.0]);
    }

    #[test]
    fn test_center_and_edges() {
        let center = StaggerRule::each(1.0).from(StaggerFrom::Center).offsets(5).unwrap();
        assert_offsets(&center, &[2.0, 1.0, 0.0, 1.0, 2.0]);

        let edges = StaggerRule::each(1.0).from(StaggerFrom::Edges).offsets(5).unwrap();
        assert_offsets(&edges, &[0.0, 1.0, 2.0, 1.0, 0.0]);

        // Even batches have two middle elements that start together.
        let even = StaggerRule::each(1.0).from(StaggerFrom::Center).offsets(4).unwrap();
        assert_offsets(&even, &[1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_index_origin() {
        let offsets = StaggerRule::each(0.5).from(StaggerFrom::Index(1)).offsets(4).unwrap();
        assert_offsets(&offsets, &[0.5, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_amount_splits_total() {
        let offsets = StaggerRule::amount(1.0).offsets(5).unwrap();
        assert_offsets(&offsets, &[0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_offsets(&StaggerRule::amount(1.0).offsets(1).unwrap(), &[0.0]);
    }

    #[test]
    fn test_malformed_rules() {
        assert!(matches!(
            StaggerRule::each(-0.1).offsets(3),
            Err(SequencerError::InvalidSegment(_))
        ));
        assert!(matches!(
            StaggerRule::each(f32::NAN).offsets(3),
            Err(SequencerError::InvalidSegment(_))
        ));
        assert!(matches!(
            StaggerRule::each(0.1).from(StaggerFrom::Index(3)).offsets(3),
            Err(SequencerError::InvalidSegment(_))
        ));
    }
}
