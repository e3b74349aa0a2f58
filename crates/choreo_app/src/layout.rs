// SPDX-License-Identifier: MIT OR Apache-2.0
//! Page geometry: stacked sections and the boxes of their elements.
//!
//! Stands in for the browser's layout engine. Boxes are expressed in
//! viewport units relative to their section, so a different viewport
//! produces a proportionally different page.

use choreo_sequencer::{Scene, StaticLayout, Viewport};
use egui::{Pos2, Rect, Vec2};
use indexmap::IndexMap;

/// Sections top to bottom with their heights in viewport heights
pub const SECTIONS: [(&str, f32); 6] = [
    ("hero", 1.0),
    ("about", 1.5),
    ("services", 2.0),
    ("projects", 6.0),
    ("experience", 1.0),
    ("footer", 1.0),
];

/// Words in each split section title
pub const TITLE_WORDS: usize = 3;

/// Panels in the services accordion
pub const SERVICE_PANELS: usize = 5;

/// Words in each service panel's description
pub const SERVICE_DESC_WORDS: usize = 8;

/// Features listed per service panel
pub const SERVICE_FEATURES: usize = 5;

/// Cards on the projects stage
pub const PROJECT_CARDS: usize = 5;

/// Name of the `index`-th element of a numbered group
pub fn numbered(prefix: &str, index: usize) -> String {
    format!("{prefix}-{index}")
}

/// Stacked page sections
#[derive(Debug, Clone)]
pub struct PageLayout {
    viewport: Viewport,
    sections: IndexMap<&'static str, Rect>,
}

impl PageLayout {
    /// Stack [`SECTIONS`] for `viewport`
    pub fn new(viewport: Viewport) -> Self {
        let mut sections = IndexMap::new();
        let mut top = 0.0;
        for (name, height) in SECTIONS {
            let rect = Rect::from_min_size(
                Pos2::new(0.0, top),
                Vec2::new(viewport.width, viewport.height * height),
            );
            top = rect.max.y;
            sections.insert(name, rect);
        }
        Self { viewport, sections }
    }

    /// Section box by name
    pub fn section(&self, name: &str) -> Option<Rect> {
        self.sections.get(name).copied()
    }

    /// Total page height
    pub fn document_height(&self) -> f32 {
        self.sections.values().last().map_or(0.0, |r| r.max.y)
    }

    /// Largest scroll offset
    pub fn scroll_limit(&self) -> f32 {
        (self.document_height() - self.viewport.height).max(0.0)
    }

    /// Box of every named element on the page, sections included
    pub fn element_boxes(&self) -> Vec<(String, Rect)> {
        let vw = self.viewport.width;
        let vh = self.viewport.height;
        let section = |name: &str| self.section(name).unwrap_or(Rect::NOTHING);
        let mut boxes: Vec<(String, Rect)> = Vec::new();
        let mut place = |name: String, origin: Rect, x: f32, y: f32, w: f32, h: f32| {
            let min = Pos2::new(origin.min.x + x * vw, origin.min.y + y * vh);
            boxes.push((name, Rect::from_min_size(min, Vec2::new(w * vw, h * vh))));
        };

        for (name, rect) in &self.sections {
            place(name.to_string(), *rect, 0.0, 0.0, rect.width() / vw, rect.height() / vh);
        }

        // Fixed overlay, laid out over the first screen
        let screen = Rect::from_min_size(Pos2::ZERO, Vec2::new(vw, vh));
        place("loading-screen".into(), screen, 0.0, 0.0, 1.0, 1.0);
        place("loading-grid".into(), screen, 0.0, 0.0, 1.0, 1.0);
        place("loading-logo".into(), screen, 0.35, 0.3, 0.3, 0.4);
        place("loading-title".into(), screen, 0.9, 0.8, 0.05, 0.15);

        let hero = section("hero");
        for i in 0..TITLE_WORDS {
            place(numbered("hero-word", i), hero, 0.05 + 0.2 * i as f32, 0.3, 0.18, 0.15);
        }
        place("hero-subtitle".into(), hero, 0.05, 0.5, 0.5, 0.05);
        place("hero-cta".into(), hero, 0.05, 0.62, 0.15, 0.06);
        place("hero-slot".into(), hero, 0.7, 0.35, 0.15, 0.15);
        place("orb".into(), hero, 0.7, 0.35, 0.15, 0.15);

        let about = section("about");
        place("about-label".into(), about, 0.05, 0.1, 0.2, 0.03);
        place("about-image".into(), about, 0.55, 0.15, 0.4, 0.5);
        place("about-heading".into(), about, 0.05, 0.2, 0.4, 0.1);
        for i in 0..TITLE_WORDS {
            place(numbered("about-line", i), about, 0.05, 0.35 + 0.12 * i as f32, 0.45, 0.1);
        }
        place("about-body".into(), about, 0.05, 0.75, 0.4, 0.2);
        place("about-number".into(), about, 0.8, 0.9, 0.15, 0.2);
        place("about-laptop".into(), about, 0.5, 0.8, 0.45, 0.5);
        place("about-slot".into(), about, 0.1, 1.1, 0.15, 0.15);

        let services = section("services");
        place("services-label".into(), services, 0.05, 0.1, 0.2, 0.03);
        for i in 0..TITLE_WORDS {
            place(numbered("services-word", i), services, 0.05 + 0.25 * i as f32, 0.2, 0.22, 0.15);
        }
        place("services-catchy".into(), services, 0.6, 0.05, 0.35, 0.1);
        place("services-title".into(), services, 0.05, 0.2, 0.9, 0.15);
        place("services-accordion".into(), services, 0.05, 0.5, 0.9, 1.2);
        place("services-slot".into(), services, 0.8, 0.3, 0.15, 0.15);
        for panel in 0..SERVICE_PANELS {
            let top = 0.55 + 0.22 * panel as f32;
            let prefix = format!("service-{panel}");
            for i in 0..TITLE_WORDS {
                place(numbered(&format!("{prefix}-word"), i), services, 0.1 + 0.12 * i as f32, top, 0.1, 0.05);
            }
            for i in 0..SERVICE_DESC_WORDS {
                let x = 0.1 + 0.045 * (i % 4) as f32;
                let y = top + 0.06 + 0.03 * (i / 4) as f32;
                place(numbered(&format!("{prefix}-desc"), i), services, x, y, 0.04, 0.025);
            }
            for i in 0..SERVICE_FEATURES {
                place(numbered(&format!("{prefix}-feature"), i), services, 0.5, top + 0.035 * i as f32, 0.3, 0.03);
            }
            place(numbered(&format!("{prefix}-dot"), 0), services, 0.9, top, 0.01, 0.01);
            place(numbered(&format!("{prefix}-dot"), 1), services, 0.92, top, 0.01, 0.01);
            place(format!("{prefix}-line"), services, 0.91, top, 0.001, 0.1);
        }

        let projects = section("projects");
        place("projects-intro".into(), projects, 0.05, 0.2, 0.5, 0.1);
        place("projects-title".into(), projects, 0.05, 0.45, 0.9, 0.3);
        place("projects-cards".into(), projects, 0.0, 1.0, 1.0, 1.0);
        place("projects-connector".into(), projects, 0.0, 1.0, 1.0, 1.0);
        for i in 0..PROJECT_CARDS {
            place(numbered("project-card", i), projects, 0.2, 1.2, 0.6, 0.6);
        }

        let experience = section("experience");
        place("experience-label".into(), experience, 0.05, 0.1, 0.2, 0.03);
        for i in 0..TITLE_WORDS {
            place(numbered("experience-word", i), experience, 0.05 + 0.2 * i as f32, 0.2, 0.18, 0.12);
        }
        place("experience-title".into(), experience, 0.05, 0.2, 0.6, 0.12);
        place("experience-desc".into(), experience, 0.05, 0.4, 0.5, 0.15);
        place("experience-logos".into(), experience, 0.55, 0.4, 0.4, 0.2);
        place("experience-marquee".into(), experience, 0.0, 0.8, 2.0, 0.1);

        let footer = section("footer");
        for i in 0..TITLE_WORDS {
            place(numbered("footer-word", i), footer, 0.05 + 0.3 * i as f32, 0.3, 0.28, 0.2);
        }
        place("footer-links".into(), footer, 0.05, 0.1, 0.9, 0.1);
        place("footer-logo".into(), footer, 0.05, 0.75, 0.15, 0.15);

        boxes
    }

    /// Register every element in `scene` and measure them
    pub fn build(&self, scene: &mut Scene) -> StaticLayout {
        let mut layout = StaticLayout::new(self.viewport);
        for (name, rect) in self.element_boxes() {
            let id = scene.insert(name);
            layout.set_box(id, rect);
        }
        layout
    }
}
