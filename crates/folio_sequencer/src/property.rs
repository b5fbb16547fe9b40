// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animatable properties and their values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A property a segment can animate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    /// Horizontal offset in pixels
    X,
    /// Vertical offset in pixels
    Y,
    /// Horizontal offset as a percentage of the target's own width
    XPercent,
    /// Vertical offset as a percentage of the target's own height
    YPercent,
    /// Rotation in degrees
    Rotation,
    /// Uniform scale factor
    Scale,
    /// Opacity (0-1)
    Opacity,
    /// Whether the target accepts pointer input
    Interactive,
}

impl Property {
    /// Value a property holds before any segment writes it
    pub fn default_value(&self) -> PropertyValue {
        match self {
            Self::X | Self::Y | Self::XPercent | Self::YPercent | Self::Rotation => {
                PropertyValue::Float(0.0)
            }
            Self::Scale | Self::Opacity => PropertyValue::Float(1.0),
            Self::Interactive => PropertyValue::Bool(true),
        }
    }

    /// Whether values of this property interpolate continuously
    pub fn is_continuous(&self) -> bool {
        !matches!(self, Self::Interactive)
    }

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::XPercent => "xPercent",
            Self::YPercent => "yPercent",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
            Self::Opacity => "opacity",
            Self::Interactive => "interactive",
        }
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value held by a property
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    /// Continuous value
    Float(f32),
    /// Discrete flag
    Bool(bool),
}

impl PropertyValue {
    /// Interpolate towards `other` at eased progress `t`
    ///
    /// Flags hold their starting value until the transition completes.
    /// Mismatched kinds snap to `other` on completion as well.
    pub fn interpolate(&self, other: &PropertyValue, t: f32) -> PropertyValue {
        match (self, other) {
            (PropertyValue::Float(a), PropertyValue::Float(b)) => {
                PropertyValue::Float(lerp(*a, *b, t))
            }
            _ => {
                if t >= 1.0 {
                    *other
                } else {
                    *self
                }
            }
        }
    }

    /// Get as float if possible
    pub fn as_float(&self) -> Option<f32> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            PropertyValue::Bool(_) => None,
        }
    }

    /// Get as flag if possible
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            PropertyValue::Float(_) => None,
        }
    }

    /// Whether the value is usable (finite floats, any flag)
    pub fn is_finite(&self) -> bool {
        match self {
            PropertyValue::Float(v) => v.is_finite(),
            PropertyValue::Bool(_) => true,
        }
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Linear interpolation between two floats
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// An ordered set of property values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySet {
    values: IndexMap<Property, PropertyValue>,
}

impl PropertySet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, property: Property, value: impl Into<PropertyValue>) -> Self {
        self.set(property, value);
        self
    }

    /// Insert or replace a value
    pub fn set(&mut self, property: Property, value: impl Into<PropertyValue>) {
        self.values.insert(property, value.into());
    }

    /// Get a value if present
    pub fn get(&self, property: Property) -> Option<PropertyValue> {
        self.values.get(&property).copied()
    }

    /// Get a value, falling back to the property default
    pub fn resolve(&self, property: Property) -> PropertyValue {
        self.get(property).unwrap_or_else(|| property.default_value())
    }

    /// Get a float value, falling back to the property default
    pub fn float(&self, property: Property) -> f32 {
        self.resolve(property).as_float().unwrap_or(0.0)
    }

    /// Whether the property is present
    pub fn contains(&self, property: Property) -> bool {
        self.values.contains_key(&property)
    }

    /// Iterate over present properties in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (Property, PropertyValue)> + '_ {
        self.values.iter().map(|(p, v)| (*p, *v))
    }

    /// Iterate over present property names
    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.values.keys().copied()
    }

    /// Number of present properties
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no property is present
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(Property, PropertyValue)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (Property, PropertyValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
