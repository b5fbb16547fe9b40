// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player settings.
//!
//! Settings are stored as RON and describe:
//! - Scene content (hero text, section copy, project titles)
//! - Scroll range and driver tuning
//! - The loading counter
//! - The scripted input replayed by the session

use folio_sequencer::{DriverConfig, Ease, ScrubMode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Error raised while loading or saving settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Reading or writing the file failed
    #[error("Settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid settings RON
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// The settings could not be written as RON
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),

    /// The file was written by a newer player
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },
}

/// Text and element counts of the portfolio scenes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    /// Hero title, split into characters
    pub title: String,
    /// Hero subtitle, split into characters
    pub subtitle: String,
    /// Welcome heading, split into words
    pub welcome_title: String,
    /// Project titles, one showcase slide each
    pub projects: Vec<String>,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            title: "platour.net".to_string(),
            subtitle: "Developer Portfolio".to_string(),
            welcome_title: "Hi, Welcome".to_string(),
            projects: [
                "E-Commerce Platform",
                "Task Management App",
                "Weather Dashboard",
                "Portfolio Website Builder",
                "Chat Application",
                "Analytics Dashboard",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
        }
    }
}

/// Scroll distance mapped onto the master timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollSettings {
    /// Offset at which the timeline starts
    pub start: f32,
    /// Scroll distance covering the whole timeline
    pub length: f32,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            start: 0.0,
            length: 10_000.0,
        }
    }
}

/// Loading counter shown before the master timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingSettings {
    /// Final counter value
    pub target: f32,
    /// Seconds to count up; 0 skips the loading phase
    pub duration: f32,
}

impl Default for LoadingSettings {
    fn default() -> Self {
        Self {
            target: 100.0,
            duration: 2.0,
        }
    }
}

/// One step of scripted input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScriptStep {
    /// Scroll linearly to `to` over `over` seconds
    Scroll {
        /// Destination scroll offset
        to: f32,
        /// Seconds the scroll takes
        over: f32,
    },
    /// Let frames pass without input
    Wait(f32),
    /// Seek the master timeline to a label
    GoTo(String),
    /// Show the next showcase slide
    NextSlide,
    /// Show the previous showcase slide
    PreviousSlide,
    /// Tear down every binding
    Teardown,
}

/// Complete player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// Settings format version
    pub version: u32,
    /// Seed for random scatter values
    pub seed: u64,
    /// Frames per wall-clock second
    pub frame_rate: f32,
    /// Whether frame records include full snapshots
    pub emit_snapshots: bool,
    /// Scene content
    pub content: ContentSettings,
    /// Scroll range of the master timeline
    pub scroll: ScrollSettings,
    /// Master driver tuning
    pub driver: DriverConfig,
    /// Showcase slide driver tuning
    pub showcase: DriverConfig,
    /// Loading counter
    pub loading: LoadingSettings,
    /// Input replayed after loading
    pub script: Vec<ScriptStep>,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            seed: folio_sequencer::timeline::DEFAULT_SEED,
            frame_rate: 60.0,
            emit_snapshots: true,
            content: ContentSettings::default(),
            scroll: ScrollSettings::default(),
            driver: DriverConfig {
                scrub: ScrubMode::Smoothed { lag: 1.0 },
                ..DriverConfig::default()
            },
            showcase: DriverConfig {
                scrub: ScrubMode::Immediate,
                seek_duration: 1.2,
                seek_ease: Ease::power_out(3),
            },
            loading: LoadingSettings::default(),
            script: vec![
                ScriptStep::Scroll {
                    to: 10_000.0,
                    over: 8.0,
                },
                ScriptStep::Wait(2.0),
                ScriptStep::GoTo("about".to_string()),
                ScriptStep::Wait(1.5),
                ScriptStep::NextSlide,
                ScriptStep::Wait(1.5),
                ScriptStep::NextSlide,
                ScriptStep::Wait(1.5),
                ScriptStep::PreviousSlide,
                ScriptStep::Wait(1.5),
                ScriptStep::Scroll { to: 0.0, over: 2.0 },
                ScriptStep::Wait(2.0),
                ScriptStep::Teardown,
            ],
        }
    }
}

impl PlayerSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_ron(&content)?;
        tracing::info!(path = %path.display(), steps = settings.script.len(), "Loaded settings");
        Ok(settings)
    }

    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> Result<Self, SettingsError> {
        let settings: PlayerSettings = ron::from_str(content)?;

        // Version check
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(SettingsError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        Ok(settings)
    }

    /// Render settings as pretty RON
    pub fn to_ron(&self) -> Result<String, SettingsError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Seconds per frame
    pub fn frame_time(&self) -> f32 {
        if self.frame_rate > 0.0 {
            1.0 / self.frame_rate
        } else {
            1.0 / 60.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = PlayerSettings::default();
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
        assert_eq!(settings.content.projects.len(), 6);
        assert_eq!(settings.driver.scrub, ScrubMode::Smoothed { lag: 1.0 });
        assert!((settings.frame_time() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_serialization() {
        let settings = PlayerSettings::default();
        let ron_str = settings.to_ron().unwrap();
        let loaded = PlayerSettings::from_ron(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let loaded = PlayerSettings::from_ron("(seed: 7, script: [Wait(1.0), GoTo(\"about\")])").unwrap();
        assert_eq!(loaded.seed, 7);
        assert_eq!(loaded.script, vec![ScriptStep::Wait(1.0), ScriptStep::GoTo("about".into())]);
        assert_eq!(loaded.scroll, ScrollSettings::default());
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = PlayerSettings::from_ron("(version: 99)").unwrap_err();
        assert!(matches!(
            err,
            SettingsError::UnsupportedVersion { found: 99, .. }
        ));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("folio_player_{}.ron", std::process::id()));
        let mut settings = PlayerSettings::default();
        settings.seed = 1234;
        settings.save(&path).unwrap();
        let loaded = PlayerSettings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.seed, 1234);
    }
}
