// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-element value sources.
//!
//! A tween may give each element in its batch a different end value: a random
//! scatter, an alternating swirl direction, or a plain constant. Sources are
//! resolved to concrete numbers once, when the segment is appended, so that a
//! scrubbed timeline always shows the same picture for the same play-head.

use crate::property::PropertyValue;
use serde::{Deserialize, Serialize};

/// How a tween computes a property's value for each element of its batch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ValueSource {
    /// Same value for every element
    Fixed(f32),
    /// Same flag for every element
    Flag(bool),
    /// Uniform random value in `[min, max)`, drawn per element
    Random {
        /// Lower bound (inclusive)
        min: f32,
        /// Upper bound (exclusive)
        max: f32,
    },
    /// `even` for even element indices, `odd` for odd ones
    Alternate {
        /// Value for indices 0, 2, 4, ...
        even: f32,
        /// Value for indices 1, 3, 5, ...
        odd: f32,
    },
}

impl ValueSource {
    /// Resolve the value for element `index`
    pub fn resolve(&self, index: usize, rng: &mut Rng64) -> PropertyValue {
        match *self {
            ValueSource::Fixed(v) => PropertyValue::Float(v),
            ValueSource::Flag(v) => PropertyValue::Bool(v),
            ValueSource::Random { min, max } => {
                PropertyValue::Float(min + (max - min) * rng.next_f32_01())
            }
            ValueSource::Alternate { even, odd } => {
                PropertyValue::Float(if index % 2 == 0 { even } else { odd })
            }
        }
    }

    /// Whether every number this source can produce is finite
    pub fn is_finite(&self) -> bool {
        match *self {
            ValueSource::Fixed(v) => v.is_finite(),
            ValueSource::Flag(_) => true,
            ValueSource::Random { min, max } => min.is_finite() && max.is_finite() && min <= max,
            ValueSource::Alternate { even, odd } => even.is_finite() && odd.is_finite(),
        }
    }
}

impl From<f32> for ValueSource {
    fn from(value: f32) -> Self {
        Self::Fixed(value)
    }
}

impl From<bool> for ValueSource {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Small deterministic generator (SplitMix64)
#[derive(Debug, Clone, Copy)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    /// Create a generator from a seed
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Next raw 64-bit value
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Next value in `[0, 1)` with 24 bits of precision
    pub fn next_f32_01(&mut self) -> f32 {
        let v = (self.next_u64() >> 40) as u32;
        v as f32 * (1.0 / (1u32 << 24) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_stays_in_range_and_is_seeded() {
        let source = ValueSource::Random {
            min: -1000.0,
            max: 1000.0,
        };
        let mut a = Rng64::new(7);
        let mut b = Rng64::new(7);
        for i in 0..64 {
            let va = source.resolve(i, &mut a).as_float().unwrap();
            let vb = source.resolve(i, &mut b).as_float().unwrap();
            assert_eq!(va, vb);
            assert!((-1000.0..1000.0).contains(&va));
        }
    }

    #[test]
    fn test_alternate_by_index() {
        let source = ValueSource::Alternate { even: 6.0, odd: -6.0 };
        let mut rng = Rng64::new(0);
        let values: Vec<_> = (0..4)
            .map(|i| source.resolve(i, &mut rng).as_float().unwrap())
            .collect();
        assert_eq!(values, vec![6.0, -6.0, 6.0, -6.0]);
    }

    #[test]
    fn test_finiteness() {
        assert!(ValueSource::Fixed(1.0).is_finite());
        assert!(!ValueSource::Fixed(f32::NAN).is_finite());
        assert!(!ValueSource::Random { min: 2.0, max: 1.0 }.is_finite());
    }
}
