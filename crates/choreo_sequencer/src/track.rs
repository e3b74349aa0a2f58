// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline tracks: ordered steps with relative timing.

use crate::step::{Position, Step};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// Absolute placement of one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStep {
    /// Index of the step in append order
    pub index: usize,
    /// Start time in seconds
    pub start: f32,
    /// Time the last target finishes (infinite for endless steps)
    pub end: f32,
}

/// An ordered list of steps
#[derive(Debug, Clone)]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Track name, used in logs
    pub name: String,
    steps: Vec<Step>,
}

impl Track {
    /// Create an empty track
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step. Relative positions are resolved lazily, against
    /// whatever precedes the step when the track is resolved.
    pub fn append(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    /// Builder-style append
    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// All steps in append order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the track has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Resolve every step to absolute times.
    ///
    /// Starts never move backwards: a step placed before its predecessor's
    /// start (a large `-=` offset) is pulled forward to that start, and
    /// nothing starts before zero. Overlap with the predecessor's body is
    /// kept as-is.
    pub fn resolve(&self) -> Vec<ResolvedStep> {
        let mut resolved: Vec<ResolvedStep> = Vec::with_capacity(self.steps.len());

        for (index, step) in self.steps.iter().enumerate() {
            let (prev_start, prev_end) = resolved
                .last()
                .map(|r| (r.start, r.end))
                .unwrap_or((0.0, 0.0));

            let wanted = match step.position() {
                Position::Sequential => prev_end,
                Position::Offset(offset) => prev_end + offset,
                Position::WithPrevious => prev_start,
                Position::At(time) => time,
            };
            // An endless predecessor has no end to be relative to
            let wanted = if wanted.is_finite() { wanted } else { prev_start };

            let start = wanted.max(prev_start).max(0.0);
            resolved.push(ResolvedStep {
                index,
                start,
                end: start + step.span(),
            });
        }

        resolved
    }

    /// End time of the step that finishes last; zero for an empty track.
    ///
    /// This is the latest end over all steps, not the end of the last
    /// declared step: a short step placed `WithPrevious` after a long one
    /// does not shorten the track.
    pub fn total_duration(&self) -> f32 {
        self.resolve()
            .iter()
            .map(|r| r.end)
            .fold(0.0, f32::max)
    }

    /// Whether the track never finishes
    pub fn is_endless(&self) -> bool {
        self.total_duration().is_infinite()
    }
}
