// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sampled visual state of a timeline.

use crate::property::{Property, PropertySet, PropertyValue};
use crate::target::TargetId;
use serde::{Deserialize, Serialize};

/// Property values of one target at a sampled time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetState {
    /// Target ID
    pub id: TargetId,
    /// Target name
    pub name: String,
    /// Resolved property values
    pub properties: PropertySet,
}

impl TargetState {
    /// Get a property value, falling back to the property's default
    pub fn value(&self, property: Property) -> PropertyValue {
        self.properties.resolve(property)
    }

    /// Get a continuous property value
    pub fn float(&self, property: Property) -> f32 {
        self.properties.float(property)
    }
}

/// Visual state of every target at one play-head position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sampled time in timeline seconds
    pub time: f32,
    /// Sampled time as a fraction of the duration
    pub progress: f32,
    /// Target states in registration order
    pub targets: Vec<TargetState>,
}

impl Snapshot {
    /// Get a target's state
    pub fn get(&self, id: TargetId) -> Option<&TargetState> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Get a target's state by name
    pub fn by_name(&self, name: &str) -> Option<&TargetState> {
        self.targets.iter().find(|t| t.name == name)
    }
}
