// SPDX-License-Identifier: MIT OR Apache-2.0
//! Driver settings.
//!
//! Stored as RON, by default in `choreo.ron` next to where the driver runs.
//! Every field is optional in the file; missing ones take their defaults.

use crate::error::Result;
use choreo_sequencer::{ChoreoConfig, Viewport};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "choreo.ron";

/// How frames are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON object per frame
    Json,
    /// Short report at the end of the run
    #[default]
    Summary,
}

/// Simulated viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        let viewport = Viewport::default();
        Self {
            width: viewport.width,
            height: viewport.height,
        }
    }
}

impl From<ViewportSettings> for Viewport {
    fn from(settings: ViewportSettings) -> Self {
        Viewport::new(settings.width, settings.height)
    }
}

/// Simulated visitor behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Length of the run in seconds
    pub duration: f32,
    /// Wheel input in pixels per second
    pub wheel_speed: f32,
    /// Seconds to wait after content is ready before scrolling
    pub pause_before_scroll: f32,
    /// Seconds between service accordion selections
    pub accordion_interval: f32,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            duration: 20.0,
            wheel_speed: 1200.0,
            pause_before_scroll: 0.5,
            accordion_interval: 3.0,
        }
    }
}

/// Everything the driver needs for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Simulated viewport
    pub viewport: ViewportSettings,
    /// Frames per second
    pub frame_rate: f32,
    /// Visitor behaviour
    pub run: RunSettings,
    /// Output format
    pub output: OutputFormat,
    /// Choreography configuration
    pub choreo: ChoreoConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            viewport: ViewportSettings::default(),
            frame_rate: 60.0,
            run: RunSettings::default(),
            output: OutputFormat::default(),
            choreo: ChoreoConfig::default(),
        }
    }
}

impl AppSettings {
    /// Seconds per frame
    pub fn frame_time(&self) -> f32 {
        1.0 / self.frame_rate.max(1.0)
    }

    /// Number of frames in a full run
    pub fn frame_count(&self) -> u64 {
        (self.run.duration.max(0.0) * self.frame_rate.max(1.0)).ceil() as u64
    }

    /// Parse from a RON string
    pub fn from_ron_str(content: &str) -> Result<Self> {
        Ok(ron::from_str(content)?)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Load settings, falling back to defaults when there is no file
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let default_path = Path::new(SETTINGS_FILE_NAME);
        match path {
            Some(path) => Self::load(path),
            None if default_path.exists() => Self::load(default_path),
            None => Ok(Self::default()),
        }
    }

    /// Serialize as pretty RON
    pub fn to_ron_string(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.frame_rate, 60.0);
        assert_eq!(settings.output, OutputFormat::Summary);
        assert_eq!(settings.choreo.reveal_start, "top 75%");
    }

    #[test]
    fn test_serialization() {
        let mut settings = AppSettings::from_ron_str("()").unwrap();
        settings.run.duration = 8.0;
        settings.output = OutputFormat::Json;
        let ron_str = settings.to_ron_string().unwrap();
        let loaded = AppSettings::from_ron_str(&ron_str).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let settings = AppSettings::from_ron_str("(run: (duration: 2.0))").unwrap();
        assert_eq!(settings.frame_rate, 60.0);
        assert_eq!(settings.frame_count(), 120);
        assert!((settings.frame_time() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_nested_choreo_config() {
        let settings = AppSettings::from_ron_str("(choreo: (reduced_motion: true))").unwrap();
        assert!(settings.choreo.reduced_motion);
        assert_eq!(settings.choreo.smooth_scroll.lerp, 0.1);
    }
}
