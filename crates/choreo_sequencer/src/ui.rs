// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline inspector.
//!
//! A read-only egui view for debugging choreography:
//! - Resolved steps of a track as bars, with the playhead
//! - Pinned stage progress, its sub-range partition and the connector

use crate::pinned::{segment, PinnedStage};
use crate::track::Track;
use egui::{Color32, Pos2, Rect, Stroke, Vec2};

const ROW_HEIGHT: f32 = 18.0;
const LABEL_WIDTH: f32 = 120.0;
const HEADER_HEIGHT: f32 = 20.0;
const PLAYHEAD_WIDTH: f32 = 2.0;
const STAGE_BAR_HEIGHT: f32 = 14.0;
const CURVE_HEIGHT: f32 = 120.0;
const CURVE_SAMPLES: usize = 24;

/// Draws tracks and stages for inspection
#[derive(Debug, Clone)]
pub struct TimelineInspector {
    /// Horizontal zoom (pixels per second)
    pub zoom: f32,
    /// Longest span drawn for endless steps, in seconds
    pub endless_span: f32,
}

impl Default for TimelineInspector {
    fn default() -> Self {
        Self {
            zoom: 80.0,
            endless_span: 10.0,
        }
    }
}

impl TimelineInspector {
    /// Create an inspector with default zoom
    pub fn new() -> Self {
        Self::default()
    }

    /// Bars for every resolved step, laid out in `rect`
    pub fn step_rects(&self, track: &Track, rect: Rect) -> Vec<Rect> {
        let origin = rect.min.x + LABEL_WIDTH;
        track
            .resolve()
            .iter()
            .enumerate()
            .map(|(row, resolved)| {
                let end = resolved.end.min(resolved.start + self.endless_span);
                let y = rect.min.y + HEADER_HEIGHT + row as f32 * ROW_HEIGHT;
                Rect::from_min_max(
                    Pos2::new(origin + resolved.start * self.zoom, y + 2.0),
                    Pos2::new(origin + end * self.zoom, y + ROW_HEIGHT - 2.0),
                )
            })
            .collect()
    }

    /// Draw a track with its playhead
    pub fn show_track(&self, ui: &mut egui::Ui, track: &Track, playhead: f32) {
        let height = HEADER_HEIGHT + track.len() as f32 * ROW_HEIGHT;
        let (response, painter) =
            ui.allocate_painter(Vec2::new(ui.available_width(), height), egui::Sense::hover());
        let rect = response.rect;

        painter.rect_filled(rect, 0.0, Color32::from_gray(30));
        painter.text(
            Pos2::new(rect.min.x + 4.0, rect.min.y + 3.0),
            egui::Align2::LEFT_TOP,
            format!("{} ({:.2}s)", track.name, track.total_duration()),
            egui::FontId::monospace(11.0),
            Color32::from_gray(200),
        );

        for (row, (bar, step)) in self.step_rects(track, rect).into_iter().zip(track.steps()).enumerate() {
            let label = step.label_text().map_or_else(|| format!("step {row}"), str::to_string);
            painter.text(
                Pos2::new(rect.min.x + 4.0, bar.center().y),
                egui::Align2::LEFT_CENTER,
                label,
                egui::FontId::monospace(10.0),
                Color32::from_gray(160),
            );

            let color = if step.targets().is_empty() {
                Color32::from_gray(70)
            } else {
                Color32::from_rgb(100, 150, 255)
            };
            painter.rect_filled(bar, 2.0, color);
        }

        let x = rect.min.x + LABEL_WIDTH + playhead * self.zoom;
        if x <= rect.max.x {
            painter.line_segment(
                [Pos2::new(x, rect.min.y), Pos2::new(x, rect.max.y)],
                Stroke::new(PLAYHEAD_WIDTH, Color32::from_rgb(255, 100, 100)),
            );
        }
    }

    /// Draw a pinned stage's progress, partition and connector
    pub fn show_stage(&self, ui: &mut egui::Ui, stage: &PinnedStage) {
        let width = ui.available_width();
        let (response, painter) = ui.allocate_painter(
            Vec2::new(width, HEADER_HEIGHT + STAGE_BAR_HEIGHT + CURVE_HEIGHT),
            egui::Sense::hover(),
        );
        let rect = response.rect;
        painter.rect_filled(rect, 0.0, Color32::from_gray(30));

        let current = stage.segment();
        let title = match current {
            Some(seg) => format!("{}: {:.2} (item {} -> {}, {:.2})", stage.name(), stage.progress(), seg.index, seg.index + 1, seg.local),
            None => format!("{}: {:.2}", stage.name(), stage.progress()),
        };
        painter.text(
            Pos2::new(rect.min.x + 4.0, rect.min.y + 3.0),
            egui::Align2::LEFT_TOP,
            title,
            egui::FontId::monospace(11.0),
            Color32::from_gray(200),
        );

        let bar = Rect::from_min_size(
            Pos2::new(rect.min.x, rect.min.y + HEADER_HEIGHT),
            Vec2::new(rect.width(), STAGE_BAR_HEIGHT),
        );
        painter.rect_filled(bar, 0.0, Color32::from_gray(45));
        let filled = Rect::from_min_size(bar.min, Vec2::new(bar.width() * stage.progress(), bar.height()));
        painter.rect_filled(filled, 0.0, Color32::from_rgb(100, 150, 255));

        for x in partition_marks(stage.items().len(), bar) {
            painter.line_segment(
                [Pos2::new(x, bar.min.y), Pos2::new(x, bar.max.y)],
                Stroke::new(1.0, Color32::from_gray(180)),
            );
        }

        let Some(connector) = stage.connector() else {
            return;
        };
        let area = Rect::from_min_max(Pos2::new(rect.min.x, bar.max.y), rect.max).shrink(8.0);
        let points: Vec<Pos2> = (0..=CURVE_SAMPLES)
            .map(|i| connector.point_at(i as f32 / CURVE_SAMPLES as f32))
            .collect();
        let fit = fit_to(&points, area);
        let color = if connector.visible {
            Color32::from_rgb(255, 200, 80)
        } else {
            Color32::from_gray(80)
        };
        for pair in points.windows(2) {
            painter.line_segment([fit(pair[0]), fit(pair[1])], Stroke::new(1.5, color));
        }
    }
}

/// X positions of the boundaries between sub-ranges
fn partition_marks(items: usize, bar: Rect) -> Vec<f32> {
    if segment(0.0, items).is_none() {
        return Vec::new();
    }
    let count = items - 1;
    (1..count)
        .map(|i| bar.min.x + bar.width() * i as f32 / count as f32)
        .collect()
}

/// Map document-space points into `area`, keeping aspect ratio
fn fit_to(points: &[Pos2], area: Rect) -> impl Fn(Pos2) -> Pos2 {
    let bounds = Rect::from_points(points);
    let scale = (area.width() / bounds.width().max(1.0)).min(area.height() / bounds.height().max(1.0));
    let offset = area.center().to_vec2() - bounds.center().to_vec2() * scale;
    move |p: Pos2| Pos2::new(p.x * scale + offset.x, p.y * scale + offset.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::StyleJournal;
    use crate::measure::{StaticLayout, Viewport};
    use crate::property::{Property, PropertyMap};
    use crate::scene::{Scene, TargetId};
    use crate::step::{Position, Repeat, Step};

    fn track() -> Track {
        let fade = |i| Step::to(vec![TargetId(i)], PropertyMap::new().with(Property::Opacity, 1.0));
        Track::new("inspect")
            .then(fade(0).duration(1.0).label("first"))
            .then(fade(1).duration(1.0).at(Position::Offset(-0.5)))
            .then(fade(2).duration(1.0).repeat(Repeat::Forever))
    }

    #[test]
    fn bars_follow_resolved_times() {
        let inspector = TimelineInspector::new();
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::new(2000.0, 200.0));
        let bars = inspector.step_rects(&track(), rect);
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].min.x, LABEL_WIDTH);
        assert_eq!(bars[1].min.x, LABEL_WIDTH + 0.5 * inspector.zoom);
        assert!(bars[2].width().is_finite());
        assert!(bars[1].min.y > bars[0].min.y);
    }

    #[test]
    fn partition_has_a_mark_between_each_sub_range() {
        let bar = Rect::from_min_size(Pos2::ZERO, Vec2::new(300.0, 10.0));
        assert_eq!(partition_marks(4, bar), vec![100.0, 200.0]);
        assert!(partition_marks(1, bar).is_empty());
    }

    #[test]
    fn renders_headless() {
        let mut scene = Scene::new();
        let container = scene.insert("cards");
        let cards = scene.insert_group("card", 3);
        let mut layout = StaticLayout::new(Viewport::new(1200.0, 800.0));
        layout.set_box(container, Rect::from_min_size(Pos2::ZERO, Vec2::new(1200.0, 800.0)));
        for &card in &cards {
            layout.set_box(card, Rect::from_min_size(Pos2::new(200.0, 100.0), Vec2::new(600.0, 400.0)));
        }
        let mut stage = PinnedStage::new(
            "cards",
            container,
            "top top".parse().unwrap(),
            "+=200%".parse().unwrap(),
            cards,
        );
        let mut journal = StyleJournal::new();
        stage.apply_progress(0.25, &layout, &mut scene, &mut journal);

        let inspector = TimelineInspector::new();
        let track = track();
        let ctx = egui::Context::default();
        let output = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                inspector.show_track(ui, &track, 1.2);
                inspector.show_stage(ui, &stage);
            });
        });
        assert!(!output.shapes.is_empty());
    }
}
