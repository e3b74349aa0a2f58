// SPDX-License-Identifier: MIT OR Apache-2.0
//! Construction-time errors.
//!
//! Only parsing and configuration can fail. Once a choreography is built,
//! runtime problems (missing targets, vanished elements, resizes) are
//! suppressed and logged instead of returned.

use thiserror::Error;

/// Errors raised while building a choreography
#[derive(Debug, Error)]
pub enum ChoreoError {
    /// Ease name is not recognised
    #[error("Unknown ease: {0:?}")]
    UnknownEase(String),

    /// Position parameter could not be parsed
    #[error("Invalid position parameter: {0:?}")]
    InvalidPosition(String),

    /// Trigger point or range end could not be parsed
    #[error("Invalid trigger point: {0:?}")]
    InvalidTriggerPoint(String),

    /// Two decoration handoffs claim the same scroll offsets
    #[error("Handoff ranges overlap: {first} and {second}")]
    OverlappingHandoff {
        /// Earlier handoff
        first: String,
        /// Later handoff
        second: String,
    },

    /// Config file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Config could not be serialized
    #[error("Config serialization error: {0}")]
    ConfigWrite(#[from] ron::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for choreography construction
pub type Result<T> = std::result::Result<T, ChoreoError>;
