// SPDX-License-Identifier: MIT OR Apache-2.0
//! Choreography configuration, stored as RON.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Connector curve tuning for pinned stages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Sag as a fraction of the endpoint distance
    pub sag_ratio: f32,
    /// Upper bound on the sag in pixels
    pub max_sag: f32,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            sag_ratio: 0.2,
            max_sag: 120.0,
        }
    }
}

/// Smooth scrolling tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothScrollConfig {
    /// Fraction of the remaining distance covered each frame
    pub lerp: f32,
    /// Multiplier applied to wheel deltas
    pub wheel_multiplier: f32,
}

impl Default for SmoothScrollConfig {
    fn default() -> Self {
        Self {
            lerp: 0.1,
            wheel_multiplier: 1.0,
        }
    }
}

/// Configuration handed to an orchestrator at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoreoConfig {
    /// Skip time-driven motion: players jump to their end state
    pub reduced_motion: bool,
    /// Default start point for one-shot reveals
    pub reveal_start: String,
    /// Pinned stage connector
    pub connector: ConnectorConfig,
    /// Smooth scrolling
    pub smooth_scroll: SmoothScrollConfig,
}

impl Default for ChoreoConfig {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            reveal_start: "top 75%".to_string(),
            connector: ConnectorConfig::default(),
            smooth_scroll: SmoothScrollConfig::default(),
        }
    }
}

impl ChoreoConfig {
    /// Parse from a RON string. Missing fields take their defaults.
    pub fn from_ron_str(content: &str) -> Result<Self> {
        Ok(ron::from_str(content)?)
    }

    /// Load from a RON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Serialize as pretty RON
    pub fn to_ron_string(&self) -> Result<String> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ChoreoConfig::default();
        assert!(!config.reduced_motion);
        assert_eq!(config.reveal_start, "top 75%");
        assert_eq!(config.smooth_scroll.lerp, 0.1);
    }

    #[test]
    fn test_serialization() {
        let mut config = ChoreoConfig::default();
        config.reduced_motion = true;
        config.connector.max_sag = 80.0;
        let ron_str = config.to_ron_string().unwrap();
        let loaded = ChoreoConfig::from_ron_str(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let loaded = ChoreoConfig::from_ron_str("(reduced_motion: true)").unwrap();
        assert!(loaded.reduced_motion);
        assert_eq!(loaded.connector, ConnectorConfig::default());
    }

    #[test]
    fn test_bad_config_is_an_error() {
        assert!(ChoreoConfig::from_ron_str("(reduced_motion: maybe)").is_err());
    }
}
