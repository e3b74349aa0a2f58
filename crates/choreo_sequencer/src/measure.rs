// SPDX-License-Identifier: MIT OR Apache-2.0
//! Live layout measurement.
//!
//! Trigger math and connector geometry never touch a real layout engine;
//! they ask a [`Measure`] implementation every frame. Nothing measured is
//! cached across frames, so a resize takes effect on the next update.

use crate::property::Property;
use crate::scene::{Scene, TargetId};
use egui::{Pos2, Rect, Vec2};
use std::collections::HashMap;

/// Visible viewport size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl Viewport {
    /// Create a viewport
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1440.0, 900.0)
    }
}

/// Layout measurement capability
pub trait Measure {
    /// Current viewport size
    fn viewport(&self) -> Viewport;

    /// Untransformed box of an element in document coordinates
    fn layout_box(&self, target: TargetId) -> Option<Rect>;

    /// Box of an element including its current translation and scale
    fn bounds(&self, scene: &Scene, target: TargetId) -> Option<Rect> {
        if !scene.is_mounted(target) {
            return None;
        }
        let base = self.layout_box(target)?;
        let value = |p: Property| scene.value(target, p).unwrap_or_else(|| p.rest_value());

        let offset = Vec2::new(
            value(Property::X) + value(Property::XPercent) / 100.0 * base.width(),
            value(Property::Y) + value(Property::YPercent) / 100.0 * base.height(),
        );
        let scale = value(Property::Scale);
        Some(Rect::from_center_size(base.center() + offset, base.size() * scale))
    }
}

/// Fixed layout, used by the headless driver and by tests
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    viewport: Viewport,
    boxes: HashMap<TargetId, Rect>,
}

impl StaticLayout {
    /// Create a layout with the given viewport
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            boxes: HashMap::new(),
        }
    }

    /// Place an element
    pub fn set_box(&mut self, target: TargetId, rect: Rect) {
        self.boxes.insert(target, rect);
    }

    /// Builder-style placement from top-left corner and size
    pub fn with_box(mut self, target: TargetId, min: Pos2, size: Vec2) -> Self {
        self.set_box(target, Rect::from_min_size(min, size));
        self
    }

    /// Remove an element from the layout
    pub fn remove_box(&mut self, target: TargetId) {
        self.boxes.remove(&target);
    }

    /// Change the viewport (resize)
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
}

impl Measure for StaticLayout {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn layout_box(&self, target: TargetId) -> Option<Rect> {
        self.boxes.get(&target).copied()
    }
}
