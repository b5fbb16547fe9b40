// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves.
//!
//! Curve names follow the `family.direction` notation used by web animation
//! tooling (`power3.out`, `sine.inOut`, `none`), so scene descriptions can be
//! written as plain strings in settings files.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Direction of an easing curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EaseDirection {
    /// Slow start
    In,
    /// Slow end
    Out,
    /// Slow start and end
    InOut,
}

/// An easing curve mapping linear progress to eased progress
///
/// Serialized by name, e.g. `"power3.out"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Ease {
    /// No easing
    Linear,
    /// Polynomial curve of degree `n + 1` (`power0` is linear)
    Power(u8, EaseDirection),
    /// Sinusoidal curve
    Sine(EaseDirection),
    /// Exponential curve
    Expo(EaseDirection),
}

impl Default for Ease {
    /// `power1.out`, the curve used when a tween names none
    fn default() -> Self {
        Self::Power(1, EaseDirection::Out)
    }
}

impl Ease {
    /// Shorthand for `power{n}.out`
    pub const fn power_out(n: u8) -> Self {
        Self::Power(n, EaseDirection::Out)
    }

    /// Shorthand for `power{n}.inOut`
    pub const fn power_in_out(n: u8) -> Self {
        Self::Power(n, EaseDirection::InOut)
    }

    /// Apply the curve to `t`, clamped to [0, 1]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear | Self::Power(0, _) => t,
            Self::Power(n, dir) => power(n, dir, t),
            Self::Sine(EaseDirection::In) => 1.0 - (t * PI / 2.0).cos(),
            Self::Sine(EaseDirection::Out) => (t * PI / 2.0).sin(),
            Self::Sine(EaseDirection::InOut) => -((PI * t).cos() - 1.0) / 2.0,
            Self::Expo(dir) => expo(dir, t),
        }
    }
}

fn power(n: u8, dir: EaseDirection, t: f32) -> f32 {
    let exp = i32::from(n) + 1;
    match dir {
        EaseDirection::In => t.powi(exp),
        EaseDirection::Out => 1.0 - (1.0 - t).powi(exp),
        EaseDirection::InOut => {
            if t < 0.5 {
                2f32.powi(exp - 1) * t.powi(exp)
            } else {
                1.0 - (-2.0 * t + 2.0).powi(exp) / 2.0
            }
        }
    }
}

fn expo(dir: EaseDirection, t: f32) -> f32 {
    // Exact endpoints; the closed forms only approach 0 and 1.
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    match dir {
        EaseDirection::In => 2f32.powf(10.0 * t - 10.0),
        EaseDirection::Out => 1.0 - 2f32.powf(-10.0 * t),
        EaseDirection::InOut => {
            if t < 0.5 {
                2f32.powf(20.0 * t - 10.0) / 2.0
            } else {
                (2.0 - 2f32.powf(-20.0 * t + 10.0)) / 2.0
            }
        }
    }
}

/// Error returned when an ease name cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown ease: {0}")]
pub struct ParseEaseError(pub String);

impl FromStr for Ease {
    type Err = ParseEaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (family, direction) = match trimmed.split_once('.') {
            Some((family, direction)) => (family, Some(direction)),
            None => (trimmed, None),
        };

        let direction = match direction {
            None | Some("out") => EaseDirection::Out,
            Some("in") => EaseDirection::In,
            Some("inOut") => EaseDirection::InOut,
            Some(_) => return Err(ParseEaseError(s.to_string())),
        };

        match family {
            "none" | "linear" => Ok(Self::Linear),
            "sine" => Ok(Self::Sine(direction)),
            "expo" => Ok(Self::Expo(direction)),
            "quad" => Ok(Self::Power(1, direction)),
            "cubic" => Ok(Self::Power(2, direction)),
            "quart" => Ok(Self::Power(3, direction)),
            "quint" | "strong" => Ok(Self::Power(4, direction)),
            _ => family
                .strip_prefix("power")
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|n| *n <= 4)
                .map(|n| Self::Power(n, direction))
                .ok_or_else(|| ParseEaseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Ease {
    type Error = ParseEaseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Ease> for String {
    fn from(ease: Ease) -> Self {
        ease.to_string()
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = |d: &EaseDirection| match d {
            EaseDirection::In => "in",
            EaseDirection::Out => "out",
            EaseDirection::InOut => "inOut",
        };
        match self {
            Self::Linear => write!(f, "none"),
            Self::Power(n, d) => write!(f, "power{n}.{}", dir(d)),
            Self::Sine(d) => write!(f, "sine.{}", dir(d)),
            Self::Expo(d) => write!(f, "expo.{}", dir(d)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_endpoints_are_exact() {
        let eases = [
            Ease::Linear,
            Ease::default(),
            Ease::power_out(3),
            Ease::power_in_out(2),
            Ease::Sine(EaseDirection::InOut),
            Ease::Expo(EaseDirection::Out),
        ];
        for ease in eases {
            assert!(ease.apply(0.0).abs() < EPS, "{ease} at 0");
            assert!((ease.apply(1.0) - 1.0).abs() < EPS, "{ease} at 1");
        }
    }

    #[test]
    fn test_power3_out_shape() {
        // 1 - (1 - 0.5)^4
        assert!((Ease::power_out(3).apply(0.5) - 0.9375).abs() < EPS);
        assert!((Ease::Power(3, EaseDirection::In).apply(0.5) - 0.0625).abs() < EPS);
    }

    #[test]
    fn test_in_out_is_symmetric() {
        let ease = Ease::power_in_out(2);
        assert!((ease.apply(0.5) - 0.5).abs() < EPS);
        let a = ease.apply(0.25);
        let b = ease.apply(0.75);
        assert!((a + b - 1.0).abs() < EPS);
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(Ease::Linear.apply(-1.0), 0.0);
        assert_eq!(Ease::Linear.apply(2.0), 1.0);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("power3.out".parse::<Ease>().unwrap(), Ease::power_out(3));
        assert_eq!("power2.inOut".parse::<Ease>().unwrap(), Ease::power_in_out(2));
        assert_eq!("power2".parse::<Ease>().unwrap(), Ease::power_out(2));
        assert_eq!("none".parse::<Ease>().unwrap(), Ease::Linear);
        assert_eq!(
            "sine.inOut".parse::<Ease>().unwrap(),
            Ease::Sine(EaseDirection::InOut)
        );
        assert!("power9.out".parse::<Ease>().is_err());
        assert!("bounce.sideways".parse::<Ease>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for name in ["none", "power3.out", "power2.inOut", "sine.in", "expo.out"] {
            let ease: Ease = name.parse().unwrap();
            assert_eq!(ease.to_string(), name);
        }
    }

    #[test]
    fn test_serializes_by_name() {
        let json = serde_json::to_string(&Ease::power_out(3)).unwrap();
        assert_eq!(json, "\"power3.out\"");
        let ease: Ease = serde_json::from_str("\"sine.inOut\"").unwrap();
        assert_eq!(ease, Ease::Sine(EaseDirection::InOut));
        assert!(serde_json::from_str::<Ease>("\"wobble\"").is_err());
    }
}
