// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors raised by the sequencer.

use crate::target::TargetId;

/// Result alias used throughout the sequencer
pub type SequencerResult<T> = Result<T, SequencerError>;

/// Error raised by timeline construction or driving
///
/// Every variant is a local validation failure reported by the call that
/// caused it. Nothing is retried and no state is changed by a failed call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SequencerError {
    /// A label with this name already exists
    #[error("Duplicate label: {0}")]
    DuplicateLabel(String),

    /// No label with this name exists
    #[error("Unknown label: {0}")]
    UnknownLabel(String),

    /// Label position lies outside the timeline
    #[error("Label {name} at {position} is outside [0, {duration}]")]
    LabelOutOfRange {
        /// Label name
        name: String,
        /// Requested position
        position: f32,
        /// Timeline duration at the time of the call
        duration: f32,
    },

    /// Segment parameters are malformed
    #[error("Invalid segment: {0}")]
    InvalidSegment(String),

    /// Segment references a target the timeline does not own
    #[error("Unknown target: {0:?}")]
    UnknownTarget(TargetId),

    /// The driver is not bound, or was torn down
    #[error("Driver is not bound")]
    DriverUnbound,
}

impl SequencerError {
    /// Shorthand for an [`SequencerError::InvalidSegment`]
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidSegment(reason.into())
    }
}
