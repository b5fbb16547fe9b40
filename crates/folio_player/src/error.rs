// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player errors.

use crate::settings::SettingsError;
use folio_sequencer::SequencerError;

/// Error that stops the player
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    /// Settings could not be loaded
    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// Building or driving a timeline failed
    #[error("Sequencer error: {0}")]
    Sequencer(#[from] SequencerError),

    /// A frame record could not be encoded
    #[error("Failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    /// A frame record could not be written
    #[error("Failed to write frame: {0}")]
    Output(#[from] std::io::Error),
}
