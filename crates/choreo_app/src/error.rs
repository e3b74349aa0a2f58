// SPDX-License-Identifier: MIT OR Apache-2.0
//! Driver errors.

use choreo_sequencer::ChoreoError;
use thiserror::Error;

/// Errors raised while loading settings, building the page or writing output
#[derive(Debug, Error)]
pub enum AppError {
    /// Choreography construction failed
    #[error(transparent)]
    Choreo(#[from] ChoreoError),

    /// The page layout has no element with this name
    #[error("Missing page element: {0:?}")]
    MissingElement(String),

    /// Settings file could not be parsed
    #[error("Settings parse error: {0}")]
    SettingsParse(#[from] ron::error::SpannedError),

    /// Settings could not be serialized
    #[error("Settings serialization error: {0}")]
    SettingsWrite(#[from] ron::Error),

    /// Frame output could not be written
    #[error("Output error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the driver
pub type Result<T> = std::result::Result<T, AppError>;
