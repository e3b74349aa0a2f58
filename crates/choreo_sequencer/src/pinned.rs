// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pinned stages: a held viewport region whose items hand over to each
//! other as the page scrolls through a fixed distance.
//!
//! The pinned distance is split into `N - 1` equal sub-ranges. Inside
//! sub-range `i`, item `i` turns away to the left while item `i + 1`
//! swings in from below. A connector curve links the two items while the
//! handover is in progress.

use crate::config::ConnectorConfig;
use crate::journal::StyleJournal;
use crate::measure::{Measure, Viewport};
use crate::property::Property;
use crate::scene::{Scene, TargetId};
use crate::trigger::{RangeEnd, ScrollRange, TriggerPoint};
use egui::Pos2;

/// Local progress within sub-ranges closer than this to 0 or 1 is snapped.
const SEGMENT_EPSILON: f32 = 1e-4;

/// Position inside the sub-range partition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Sub-range index; item `index` is outgoing, `index + 1` incoming
    pub index: usize,
    /// Progress inside the sub-range, in [0, 1]
    pub local: f32,
}

impl Segment {
    /// Whether a handover is visibly in progress
    pub fn in_transition(&self) -> bool {
        self.local > 0.0 && self.local < 1.0
    }
}

/// Map stage progress onto `items - 1` sub-ranges.
///
/// Returns `None` with fewer than two items. Progress 1 lands on the last
/// sub-range with local progress 1.
pub fn segment(progress: f32, items: usize) -> Option<Segment> {
    if items < 2 {
        return None;
    }
    let count = items - 1;
    let scaled = progress.clamp(0.0, 1.0) * count as f32;
    let index = (scaled.floor() as usize).min(count - 1);
    let mut local = (scaled - index as f32).clamp(0.0, 1.0);

    if local < SEGMENT_EPSILON {
        local = 0.0;
    } else if local > 1.0 - SEGMENT_EPSILON {
        local = 1.0;
    }
    Some(Segment { index, local })
}

/// Quadratic curve between two items
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    /// Outgoing item's right-edge midpoint
    pub from: Pos2,
    /// Control point, below the chord midpoint by the sag
    pub control: Pos2,
    /// Incoming item's left-edge midpoint
    pub to: Pos2,
    /// Drawn only while a handover is in progress
    pub visible: bool,
}

impl Connector {
    /// Build the curve. Sag grows with distance up to `max_sag`.
    pub fn between(from: Pos2, to: Pos2, config: &ConnectorConfig, visible: bool) -> Self {
        let sag = (from.distance(to) * config.sag_ratio).min(config.max_sag);
        let control = Pos2::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0 + sag);
        Self {
            from,
            control,
            to,
            visible,
        }
    }

    /// Vertical distance from the chord midpoint to the control point
    pub fn sag(&self) -> f32 {
        self.control.y - (self.from.y + self.to.y) / 2.0
    }

    /// Point on the curve at `t` in [0, 1]
    pub fn point_at(&self, t: f32) -> Pos2 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let x = u * u * self.from.x + 2.0 * u * t * self.control.x + t * t * self.to.x;
        let y = u * u * self.from.y + 2.0 * u * t * self.control.y + t * t * self.to.y;
        Pos2::new(x, y)
    }

    /// SVG path data (`M x y Q cx cy x y`)
    pub fn to_svg_path(&self) -> String {
        format!(
            "M {:.1} {:.1} Q {:.1} {:.1} {:.1} {:.1}",
            self.from.x, self.from.y, self.control.x, self.control.y, self.to.x, self.to.y
        )
    }
}

/// A pinned multi-item transition driven by scroll
#[derive(Debug, Clone)]
pub struct PinnedStage {
    name: String,
    trigger: TargetId,
    start: TriggerPoint,
    end: RangeEnd,
    items: Vec<TargetId>,
    connector_target: Option<TargetId>,
    connector_config: ConnectorConfig,
    listening: bool,
    progress: f32,
    connector: Option<Connector>,
}

impl PinnedStage {
    /// Create a stage pinned over `start..end` of `trigger`
    pub fn new(
        name: impl Into<String>,
        trigger: TargetId,
        start: TriggerPoint,
        end: RangeEnd,
        items: Vec<TargetId>,
    ) -> Self {
        Self {
            name: name.into(),
            trigger,
            start,
            end,
            items,
            connector_target: None,
            connector_config: ConnectorConfig::default(),
            listening: false,
            progress: 0.0,
            connector: None,
        }
    }

    /// Element whose opacity follows connector visibility
    pub fn with_connector(mut self, target: TargetId) -> Self {
        self.connector_target = Some(target);
        self
    }

    /// Connector curve tuning
    pub fn with_connector_config(mut self, config: ConnectorConfig) -> Self {
        self.connector_config = config;
        self
    }

    /// Stage name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stage items in order
    pub fn items(&self) -> &[TargetId] {
        &self.items
    }

    /// Last applied stage progress
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Current sub-range, if there are at least two items
    pub fn segment(&self) -> Option<Segment> {
        segment(self.progress, self.items.len())
    }

    /// Connector computed by the last update
    pub fn connector(&self) -> Option<&Connector> {
        self.connector.as_ref()
    }

    /// Whether the stage follows scroll
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Start following scroll
    pub fn arm(&mut self) {
        self.listening = true;
    }

    /// Stop following scroll
    pub fn detach(&mut self) {
        self.listening = false;
    }

    /// Scroll range the stage is pinned over
    pub fn range(&self, measure: &dyn Measure, scene: &Scene) -> Option<ScrollRange> {
        if !scene.is_mounted(self.trigger) {
            return None;
        }
        let element = measure.layout_box(self.trigger)?;
        Some(ScrollRange::resolve(&self.start, &self.end, element, measure.viewport()))
    }

    /// Put every item in its starting pose
    pub fn prepare(&mut self, viewport: Viewport, scene: &mut Scene, journal: &mut StyleJournal) {
        self.progress = 0.0;
        self.pose(viewport, scene, journal);
        self.set_connector_opacity(false, scene, journal);
    }

    /// React to a scroll position
    pub fn on_scroll(&mut self, scroll: f32, measure: &dyn Measure, scene: &mut Scene, journal: &mut StyleJournal) {
        if !self.listening {
            return;
        }
        match self.range(measure, scene) {
            Some(range) => self.apply_progress(range.progress(scroll), measure, scene, journal),
            None => {
                tracing::debug!(stage = %self.name, "stage trigger missing, detaching");
                self.listening = false;
            }
        }
    }

    /// Render the stage at `progress` and recompute the connector from
    /// live bounds.
    pub fn apply_progress(
        &mut self,
        progress: f32,
        measure: &dyn Measure,
        scene: &mut Scene,
        journal: &mut StyleJournal,
    ) {
        self.progress = progress.clamp(0.0, 1.0);
        self.pose(measure.viewport(), scene, journal);

        self.connector = self.segment().and_then(|seg| {
            let outgoing = measure.bounds(scene, self.items[seg.index])?;
            let incoming = measure.bounds(scene, self.items[seg.index + 1])?;
            Some(Connector::between(
                outgoing.right_center(),
                incoming.left_center(),
                &self.connector_config,
                seg.in_transition(),
            ))
        });

        let visible = self.connector.is_some_and(|c| c.visible);
        self.set_connector_opacity(visible, scene, journal);
    }

    fn pose(&self, viewport: Viewport, scene: &mut Scene, journal: &mut StyleJournal) {
        let Some(seg) = self.segment() else {
            if let Some(&first) = self.items.first() {
                journal.write(scene, first, Property::Scale, 1.0);
                journal.write(scene, first, Property::Opacity, 1.0);
            }
            return;
        };

        for (i, &item) in self.items.iter().enumerate() {
            if i < seg.index {
                outgoing_pose(item, 1.0, viewport, scene, journal);
            } else if i == seg.index {
                outgoing_pose(item, seg.local, viewport, scene, journal);
            } else if i == seg.index + 1 {
                incoming_pose(item, seg.local, viewport, scene, journal);
            } else {
                incoming_pose(item, 0.0, viewport, scene, journal);
            }
        }
    }

    fn set_connector_opacity(&self, visible: bool, scene: &mut Scene, journal: &mut StyleJournal) {
        if let Some(target) = self.connector_target {
            journal.write(scene, target, Property::Opacity, if visible { 1.0 } else { 0.0 });
        }
    }
}

fn outgoing_pose(item: TargetId, l: f32, viewport: Viewport, scene: &mut Scene, journal: &mut StyleJournal) {
    journal.write(scene, item, Property::RotateY, -90.0 * l);
    journal.write(scene, item, Property::X, -viewport.width * l);
    journal.write(scene, item, Property::Y, 0.0);
    journal.write(scene, item, Property::Z, 0.0);
    journal.write(scene, item, Property::Scale, 1.0);
    journal.write(scene, item, Property::Opacity, 1.0 - l);
}

fn incoming_pose(item: TargetId, l: f32, viewport: Viewport, scene: &mut Scene, journal: &mut StyleJournal) {
    journal.write(scene, item, Property::RotateY, 90.0 - 90.0 * l);
    journal.write(scene, item, Property::X, 0.0);
    journal.write(scene, item, Property::Y, viewport.height * (1.0 - l));
    journal.write(scene, item, Property::Z, -500.0 + 500.0 * l);
    journal.write(scene, item, Property::Scale, 0.5 + 0.5 * l);
    journal.write(scene, item, Property::Opacity, l);
}
