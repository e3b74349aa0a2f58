// SPDX-License-Identifier: MIT OR Apache-2.0
//! Trigger bindings: when, and how much of, a track plays.
//!
//! Trigger points use the scroll-trigger notation `"<element> <viewport>"`:
//! `"top 75%"` fires when the element's top reaches 75% down the viewport,
//! `"bottom top"` when its bottom reaches the top of the viewport.

use crate::error::ChoreoError;
use crate::journal::StyleJournal;
use crate::measure::{Measure, Viewport};
use crate::player::TrackPlayer;
use crate::scene::{Scene, TargetId};
use egui::Rect;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// A distance along the scroll axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// Absolute pixels
    Pixels(f32),
    /// Percentage of a reference extent
    Percent(f32),
}

impl Length {
    /// Resolve against a reference extent in pixels
    pub fn resolve(self, extent: f32) -> f32 {
        match self {
            Length::Pixels(px) => px,
            Length::Percent(pct) => extent * pct / 100.0,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        if let Some(pct) = s.strip_suffix('%') {
            return pct.parse().ok().map(Length::Percent);
        }
        s.strip_suffix("px").unwrap_or(s).parse().ok().map(Length::Pixels)
    }
}

/// Named or numeric position along an extent
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// Leading edge
    Top,
    /// Middle
    Center,
    /// Trailing edge
    Bottom,
    /// Fixed distance from the leading edge
    At(Length),
}

impl Anchor {
    fn resolve(self, extent: f32) -> f32 {
        match self {
            Anchor::Top => 0.0,
            Anchor::Center => extent / 2.0,
            Anchor::Bottom => extent,
            Anchor::At(length) => length.resolve(extent),
        }
    }
}

/// An anchor plus an optional `+=`/`-=` offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Base anchor
    pub anchor: Anchor,
    /// Signed offset from the anchor
    pub offset: Option<Length>,
}

impl Edge {
    fn resolve(self, extent: f32) -> f32 {
        self.anchor.resolve(extent) + self.offset.map_or(0.0, |o| o.resolve(extent))
    }

    fn parse(token: &str) -> Option<Self> {
        let (base, offset) = match token.find("+=").or_else(|| token.find("-=")) {
            Some(idx) => {
                let sign = if token[idx..].starts_with('-') { -1.0 } else { 1.0 };
                let offset = match Length::parse(&token[idx + 2..])? {
                    Length::Pixels(px) => Length::Pixels(sign * px),
                    Length::Percent(pct) => Length::Percent(sign * pct),
                };
                (&token[..idx], Some(offset))
            }
            None => (token, None),
        };

        let anchor = match base {
            "top" => Anchor::Top,
            "center" => Anchor::Center,
            "bottom" => Anchor::Bottom,
            other => Anchor::At(Length::parse(other)?),
        };
        Some(Edge { anchor, offset })
    }
}

/// Where an element edge meets a viewport edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerPoint {
    /// Edge on the trigger element (offsets relative to its height)
    pub element: Edge,
    /// Edge on the viewport (offsets relative to its height)
    pub viewport: Edge,
}

impl TriggerPoint {
    /// Scroll offset at which the two edges line up
    pub fn scroll_offset(&self, element: Rect, viewport: Viewport) -> f32 {
        let element_y = element.top() + self.element.resolve(element.height());
        element_y - self.viewport.resolve(viewport.height)
    }
}

impl FromStr for TriggerPoint {
    type Err = ChoreoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ChoreoError::InvalidTriggerPoint(s.to_string());
        let mut tokens = s.split_whitespace();
        let element = tokens.next().and_then(Edge::parse).ok_or_else(invalid)?;
        let viewport = tokens.next().and_then(Edge::parse).ok_or_else(invalid)?;
        if tokens.next().is_some() {
            return Err(invalid());
        }
        Ok(TriggerPoint { element, viewport })
    }
}

/// End of a scrubbed range
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeEnd {
    /// Another trigger point (`"bottom top"`)
    Point(TriggerPoint),
    /// Distance past the start (`"+=500%"`, percent of viewport height)
    Distance(Length),
}

impl FromStr for RangeEnd {
    type Err = ChoreoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().strip_prefix("+=") {
            Some(rest) => Length::parse(rest)
                .map(RangeEnd::Distance)
                .ok_or_else(|| ChoreoError::InvalidTriggerPoint(s.to_string())),
            None => s.parse().map(RangeEnd::Point),
        }
    }
}

/// A resolved scroll range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollRange {
    /// Scroll offset where progress is 0
    pub start: f32,
    /// Scroll offset where progress is 1
    pub end: f32,
}

impl ScrollRange {
    /// Create a range
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Resolve `start`/`end` against a trigger element's box
    pub fn resolve(start: &TriggerPoint, end: &RangeEnd, element: Rect, viewport: Viewport) -> Self {
        let start_offset = start.scroll_offset(element, viewport);
        let end_offset = match end {
            RangeEnd::Point(point) => point.scroll_offset(element, viewport),
            RangeEnd::Distance(length) => start_offset + length.resolve(viewport.height),
        };
        Self::new(start_offset, end_offset)
    }

    /// Progress through the range: a pure, clamped, monotonic function of
    /// the scroll offset. Exactly 0 at `start` and 1 at `end`.
    pub fn progress(&self, scroll: f32) -> f32 {
        if scroll <= self.start {
            return 0.0;
        }
        if scroll >= self.end {
            return 1.0;
        }
        ((scroll - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }

    /// Whether `scroll` lies inside the range (inclusive)
    pub fn contains(&self, scroll: f32) -> bool {
        scroll >= self.start && scroll <= self.end
    }

    /// Length of the range
    pub fn length(&self) -> f32 {
        self.end - self.start
    }
}

/// Unique identifier for a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BindingId(pub Uuid);

impl BindingId {
    /// Create a new random binding ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BindingId {
    fn default() -> Self {
        Self::new()
    }
}

/// How a binding drives its track
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    /// Play once, on the frame clock, when the start point is crossed
    OneShot {
        /// Activation threshold
        start: TriggerPoint,
    },
    /// Map scroll progress between `start` and `end` to the playhead
    Scrubbed {
        /// Where progress is 0
        start: TriggerPoint,
        /// Where progress is 1
        end: RangeEnd,
    },
}

/// Lifecycle of a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingState {
    /// No listener attached
    #[default]
    Inactive,
    /// Listening for the start point
    Armed,
    /// Playing (one-shot) or following scroll (scrubbed)
    Active,
    /// Played to the end, listener detached
    Completed,
}

/// A track bound to scroll position
#[derive(Debug)]
pub struct TriggerBinding {
    id: BindingId,
    trigger: TargetId,
    activation: Activation,
    state: BindingState,
    listening: bool,
    orphaned: bool,
    player: TrackPlayer,
    progress: Option<f32>,
}

impl TriggerBinding {
    /// Bind a prepared player to a trigger element
    pub fn new(trigger: TargetId, activation: Activation, player: TrackPlayer) -> Self {
        Self {
            id: BindingId::new(),
            trigger,
            activation,
            state: BindingState::Inactive,
            listening: false,
            orphaned: false,
            player,
            progress: None,
        }
    }

    /// Binding ID
    pub fn id(&self) -> BindingId {
        self.id
    }

    /// Trigger element
    pub fn trigger(&self) -> TargetId {
        self.trigger
    }

    /// Activation mode
    pub fn activation(&self) -> &Activation {
        &self.activation
    }

    /// Lifecycle state
    pub fn state(&self) -> BindingState {
        self.state
    }

    /// Whether a scroll listener is attached
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Last scrub progress, if this is a scrubbed binding that saw a scroll
    pub fn progress(&self) -> Option<f32> {
        self.progress
    }

    /// The bound player
    pub fn player(&self) -> &TrackPlayer {
        &self.player
    }

    /// Attach the scroll listener
    pub fn arm(&mut self) {
        if self.state != BindingState::Inactive || self.orphaned {
            return;
        }
        self.listening = true;
        self.state = match self.activation {
            Activation::OneShot { .. } => BindingState::Armed,
            Activation::Scrubbed { .. } => BindingState::Active,
        };
        tracing::debug!(binding = ?self.id, state = ?self.state, "binding armed");
    }

    /// Detach the scroll listener. Idempotent.
    pub fn detach(&mut self) {
        self.listening = false;
    }

    /// Resolve the current scroll range from live measurement
    pub fn range(&self, measure: &dyn Measure, scene: &Scene) -> Option<ScrollRange> {
        if !scene.is_mounted(self.trigger) {
            return None;
        }
        let element = measure.layout_box(self.trigger)?;
        let viewport = measure.viewport();
        Some(match &self.activation {
            Activation::OneShot { start } => {
                let at = start.scroll_offset(element, viewport);
                ScrollRange::new(at, at)
            }
            Activation::Scrubbed { start, end } => ScrollRange::resolve(start, end, element, viewport),
        })
    }

    /// React to a scroll position
    pub fn on_scroll(&mut self, scroll: f32, measure: &dyn Measure, scene: &mut Scene, journal: &mut StyleJournal) {
        if !self.listening {
            return;
        }

        let Some(range) = self.range(measure, scene) else {
            tracing::debug!(binding = ?self.id, "trigger element missing, detaching");
            self.listening = false;
            self.orphaned = true;
            self.state = BindingState::Inactive;
            return;
        };

        match (self.activation, self.state) {
            (Activation::OneShot { .. }, BindingState::Armed) => {
                if scroll >= range.start {
                    self.state = BindingState::Active;
                    tracing::debug!(binding = ?self.id, scroll, "one-shot activated");
                }
            }
            (Activation::Scrubbed { .. }, BindingState::Active) => {
                let progress = range.progress(scroll);
                self.progress = Some(progress);
                self.player.set_progress(progress, scene, journal);
            }
            _ => {}
        }
    }

    /// Advance a playing one-shot. Returns true when it completes.
    pub fn tick(&mut self, dt: f32, scene: &mut Scene, journal: &mut StyleJournal) -> bool {
        if !matches!(self.activation, Activation::OneShot { .. }) || self.state != BindingState::Active {
            return false;
        }
        self.player.advance(dt, scene, journal);
        if self.player.is_complete() {
            self.state = BindingState::Completed;
            self.listening = false;
            tracing::debug!(binding = ?self.id, "one-shot completed");
            return true;
        }
        false
    }
}
