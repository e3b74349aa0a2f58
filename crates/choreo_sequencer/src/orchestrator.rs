// SPDX-License-Identifier: MIT OR Apache-2.0
//! Page-level composition of section sequencers and the shared decoration.

use crate::config::ChoreoConfig;
use crate::ease::Ease;
use crate::error::{ChoreoError, Result};
use crate::journal::StyleJournal;
use crate::measure::Measure;
use crate::property::{lerp, Property};
use crate::scene::{Scene, SharedScene, TargetId};
use crate::sequencer::{Sequencer, SequencerScope};
use crate::trigger::{RangeEnd, ScrollRange, TriggerPoint};
use egui::Pos2;
use indexmap::IndexMap;

/// One scrubbed move of the decoration from one slot to another
#[derive(Debug, Clone)]
pub struct Handoff {
    /// Name used in logs and ownership queries
    pub name: String,
    /// Element whose scroll position bounds the move
    pub trigger: TargetId,
    /// Where the move starts
    pub start: TriggerPoint,
    /// Where the move ends
    pub end: RangeEnd,
    /// Slot the decoration leaves
    pub from: TargetId,
    /// Slot the decoration arrives at
    pub to: TargetId,
    /// Ease over the range
    pub ease: Ease,
}

impl Handoff {
    /// Create a handoff with an `inOut` ease
    pub fn new(
        name: impl Into<String>,
        trigger: TargetId,
        start: &str,
        end: &str,
        from: TargetId,
        to: TargetId,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            trigger,
            start: start.parse()?,
            end: end.parse()?,
            from,
            to,
            ease: Ease::in_out(1),
        })
    }

    /// Replace the ease
    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    fn range(&self, measure: &dyn Measure, scene: &Scene) -> Option<ScrollRange> {
        if !scene.is_mounted(self.trigger) {
            return None;
        }
        let element = measure.layout_box(self.trigger)?;
        Some(ScrollRange::resolve(&self.start, &self.end, element, measure.viewport()))
    }
}

/// Reject handoffs whose scroll ranges overlap
pub fn validate_handoffs(ranges: &[(&str, ScrollRange)]) -> Result<()> {
    let mut sorted: Vec<&(&str, ScrollRange)> = ranges.iter().collect();
    sorted.sort_by(|a, b| a.1.start.total_cmp(&b.1.start));
    for pair in sorted.windows(2) {
        let (first, a) = pair[0];
        let (second, b) = pair[1];
        if b.start < a.end {
            return Err(ChoreoError::OverlappingHandoff {
                first: first.to_string(),
                second: second.to_string(),
            });
        }
    }
    Ok(())
}

/// A single element moved between section slots by scroll.
///
/// Its position is recomputed from scratch for every scroll offset, so the
/// result does not depend on the order sections update in.
#[derive(Debug, Clone)]
pub struct GlobalDecoration {
    target: TargetId,
    handoffs: Vec<Handoff>,
    owner: Option<usize>,
}

impl GlobalDecoration {
    /// Create a decoration for `target`
    pub fn new(target: TargetId) -> Self {
        Self {
            target,
            handoffs: Vec::new(),
            owner: None,
        }
    }

    /// Append a handoff; handoffs are expected in scroll order
    pub fn with_handoff(mut self, handoff: Handoff) -> Self {
        self.handoffs.push(handoff);
        self
    }

    /// Decorated element
    pub fn target(&self) -> TargetId {
        self.target
    }

    /// Registered handoffs
    pub fn handoffs(&self) -> &[Handoff] {
        &self.handoffs
    }

    /// Handoff in progress at the last update
    pub fn owner(&self) -> Option<&str> {
        self.owner.map(|i| self.handoffs[i].name.as_str())
    }

    /// Check the measured ranges for overlap
    pub fn validate(&self, measure: &dyn Measure, scene: &Scene) -> Result<()> {
        let ranges: Vec<(&str, ScrollRange)> = self
            .handoffs
            .iter()
            .filter_map(|h| h.range(measure, scene).map(|r| (h.name.as_str(), r)))
            .collect();
        validate_handoffs(&ranges)
    }

    /// Ranges clipped so none starts before its predecessor ends
    fn clipped_ranges(&self, measure: &dyn Measure, scene: &Scene) -> Vec<Option<ScrollRange>> {
        let mut floor = f32::NEG_INFINITY;
        self.handoffs
            .iter()
            .map(|h| {
                let range = h.range(measure, scene)?;
                let start = range.start.max(floor);
                let clipped = ScrollRange::new(start, range.end.max(start));
                floor = clipped.end;
                Some(clipped)
            })
            .collect()
    }

    /// Slot position the decoration should sit at for `scroll`
    pub fn position_at(&self, scroll: f32, measure: &dyn Measure, scene: &Scene) -> Option<(Pos2, Option<usize>)> {
        let slot = |id: TargetId| -> Option<Pos2> {
            if !scene.is_mounted(id) {
                return None;
            }
            measure.layout_box(id).map(|r| r.center())
        };

        let mut position = slot(self.handoffs.first()?.from)?;
        for (i, (handoff, range)) in self.handoffs.iter().zip(self.clipped_ranges(measure, scene)).enumerate() {
            let Some(range) = range else { continue };
            if scroll < range.start {
                break;
            }
            let (Some(from), Some(to)) = (slot(handoff.from), slot(handoff.to)) else {
                continue;
            };
            if scroll < range.end {
                let t = handoff.ease.apply(range.progress(scroll));
                return Some((Pos2::new(lerp(from.x, to.x, t), lerp(from.y, to.y, t)), Some(i)));
            }
            position = to;
        }
        Some((position, None))
    }

    /// Move the decoration for `scroll`
    pub fn update(&mut self, scroll: f32, measure: &dyn Measure, scene: &mut Scene, journal: &mut StyleJournal) {
        let Some(home) = measure.layout_box(self.target).map(|r| r.center()) else {
            return;
        };
        let Some((position, owner)) = self.position_at(scroll, measure, scene) else {
            return;
        };

        if owner != self.owner {
            let from = self.owner();
            let to = owner.map(|i| self.handoffs[i].name.as_str());
            tracing::debug!(?from, ?to, scroll, "decoration ownership changed");
            self.owner = owner;
        }

        journal.write(scene, self.target, Property::X, position.x - home.x);
        journal.write(scene, self.target, Property::Y, position.y - home.y);
    }
}

/// Owns every section sequencer on a page
pub struct Orchestrator {
    config: ChoreoConfig,
    scene: SharedScene,
    sections: IndexMap<String, Sequencer>,
    decoration: Option<GlobalDecoration>,
    journal: StyleJournal,
    ready: bool,
    scroll: f32,
}

impl Orchestrator {
    /// Create an orchestrator with explicit configuration
    pub fn new(config: ChoreoConfig, scene: SharedScene) -> Self {
        Self {
            config,
            scene,
            sections: IndexMap::new(),
            decoration: None,
            journal: StyleJournal::new(),
            ready: false,
            scroll: 0.0,
        }
    }

    /// Configuration
    pub fn config(&self) -> &ChoreoConfig {
        &self.config
    }

    /// Shared scene
    pub fn scene(&self) -> &SharedScene {
        &self.scene
    }

    /// Whether content-ready was signalled
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Mount a section. A section mounted after ready is armed at once
    /// against the last scroll offset; remounting a name tears the
    /// previous one down first.
    pub fn mount_section<F>(&mut self, name: &str, measure: &dyn Measure, setup: F) -> Result<()>
    where
        F: FnOnce(&mut SequencerScope<'_>) -> Result<()>,
    {
        self.unmount_section(name);
        let mut sequencer = Sequencer::create(name, self.scene.clone(), self.config.clone(), measure, setup)?;
        if self.ready {
            sequencer.on_ready(self.scroll, measure);
        }
        tracing::info!(section = name, "section mounted");
        self.sections.insert(name.to_string(), sequencer);
        Ok(())
    }

    /// Tear a section down, then unmount its elements. Returns false if
    /// no such section is mounted.
    pub fn unmount_section(&mut self, name: &str) -> bool {
        let Some(mut sequencer) = self.sections.shift_remove(name) else {
            return false;
        };
        sequencer.teardown();
        let mut scene = self.scene.lock();
        for &id in sequencer.owned_elements() {
            scene.unmount(id);
        }
        tracing::info!(section = name, "section unmounted");
        true
    }

    /// Mounted section by name
    pub fn section(&self, name: &str) -> Option<&Sequencer> {
        self.sections.get(name)
    }

    /// Mutable section by name
    pub fn section_mut(&mut self, name: &str) -> Option<&mut Sequencer> {
        self.sections.get_mut(name)
    }

    /// Mounted section names in mount order
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Install the shared decoration after checking its handoffs
    pub fn set_decoration(&mut self, decoration: GlobalDecoration, measure: &dyn Measure) -> Result<()> {
        decoration.validate(measure, &self.scene.lock())?;
        self.decoration = Some(decoration);
        Ok(())
    }

    /// The shared decoration
    pub fn decoration(&self) -> Option<&GlobalDecoration> {
        self.decoration.as_ref()
    }

    /// Handoff currently moving the decoration
    pub fn decoration_owner(&self) -> Option<&str> {
        self.decoration.as_ref().and_then(|d| d.owner())
    }

    /// Last scroll offset fed to [`Orchestrator::on_scroll`]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Content is ready. Every section is evaluated against the last
    /// scroll offset. Idempotent.
    pub fn signal_ready(&mut self, measure: &dyn Measure) {
        if self.ready {
            return;
        }
        self.ready = true;
        tracing::info!(sections = self.sections.len(), scroll = self.scroll, "content ready");
        for sequencer in self.sections.values_mut() {
            sequencer.on_ready(self.scroll, measure);
        }
    }

    /// Feed a scroll position to every section and the decoration
    pub fn on_scroll(&mut self, scroll: f32, measure: &dyn Measure) {
        self.scroll = scroll;
        for sequencer in self.sections.values_mut() {
            sequencer.on_scroll(scroll, measure);
        }
        if let Some(decoration) = &mut self.decoration {
            let mut scene = self.scene.lock();
            decoration.update(scroll, measure, &mut scene, &mut self.journal);
        }
    }

    /// Advance every section's time-driven tracks
    pub fn tick(&mut self, dt: f32) {
        for sequencer in self.sections.values_mut() {
            sequencer.tick(dt);
        }
    }

    /// Attached scroll listeners across all sections
    pub fn active_listeners(&self) -> usize {
        self.sections.values().map(Sequencer::active_listeners).sum()
    }

    /// Tear down every section, newest first, and restore the decoration
    pub fn teardown(&mut self) {
        let names: Vec<String> = self.sections.keys().rev().cloned().collect();
        for name in names {
            self.unmount_section(&name);
        }
        self.decoration = None;
        self.journal.revert(&mut self.scene.lock());
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::{StaticLayout, Viewport};
    use crate::property::PropertyMap;
    use crate::step::Step;
    use crate::track::Track;
    use egui::Vec2;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    struct Page {
        scene: SharedScene,
        layout: StaticLayout,
        orb: TargetId,
    }

    /// hero 0..800, about 800..2000, services 2000..3600
    fn page() -> Page {
        let mut scene = Scene::new();
        let hero = scene.insert("hero");
        let about = scene.insert("about");
        let services = scene.insert("services");
        let orb = scene.insert("orb");
        let hero_slot = scene.insert("hero-slot");
        let about_slot = scene.insert("about-slot");
        let services_slot = scene.insert("services-slot");

        let size = Vec2::new(100.0, 100.0);
        let layout = StaticLayout::new(Viewport::new(1200.0, 800.0))
            .with_box(hero, Pos2::new(0.0, 0.0), Vec2::new(1200.0, 800.0))
            .with_box(about, Pos2::new(0.0, 800.0), Vec2::new(1200.0, 1200.0))
            .with_box(services, Pos2::new(0.0, 2000.0), Vec2::new(1200.0, 1600.0))
            .with_box(orb, Pos2::new(1000.0, 300.0), size)
            .with_box(hero_slot, Pos2::new(1000.0, 300.0), size)
            .with_box(about_slot, Pos2::new(100.0, 1200.0), size)
            .with_box(services_slot, Pos2::new(1000.0, 2400.0), size);

        Page {
            scene: scene.shared(),
            layout,
            orb,
        }
    }

    fn decoration(p: &Page, second_start: &str) -> GlobalDecoration {
        let scene = p.scene.lock();
        let id = |n: &str| scene.lookup(n).unwrap();
        GlobalDecoration::new(p.orb)
            .with_handoff(
                Handoff::new("hero-about", id("about"), "top bottom", "top top", id("hero-slot"), id("about-slot"))
                    .unwrap()
                    .with_ease(Ease::Linear),
            )
            .with_handoff(
                Handoff::new(
                    "about-services",
                    id("services"),
                    second_start,
                    "top top",
                    id("about-slot"),
                    id("services-slot"),
                )
                .unwrap()
                .with_ease(Ease::Linear),
            )
    }

    fn reveal(scope: &mut SequencerScope<'_>) -> Result<()> {
        let section = scope.element("about");
        let title = scope.element("about-title");
        let track = Track::new("about-reveal")
            .then(Step::from(vec![title], PropertyMap::new().with(Property::Opacity, 0.0)));
        scope.once(section, "top 75%", track)?;
        Ok(())
    }

    #[test]
    fn overlapping_handoffs_are_rejected() {
        let ranges = [("a", ScrollRange::new(0.0, 800.0)), ("b", ScrollRange::new(700.0, 900.0))];
        assert!(matches!(
            validate_handoffs(&ranges),
            Err(ChoreoError::OverlappingHandoff { .. })
        ));
        let ranges = [("a", ScrollRange::new(0.0, 800.0)), ("b", ScrollRange::new(800.0, 900.0))];
        assert!(validate_handoffs(&ranges).is_ok());

        let p = page();
        let mut orchestrator = Orchestrator::new(ChoreoConfig::default(), p.scene.clone());
        // services "top 200%" starts at 400, inside the first handoff
        let overlapping = decoration(&p, "top 200%");
        assert!(orchestrator.set_decoration(overlapping, &p.layout).is_err());
        assert!(orchestrator.set_decoration(decoration(&p, "top bottom"), &p.layout).is_ok());
    }

    #[test]
    fn decoration_is_a_function_of_scroll() {
        let p = page();
        let mut orchestrator = Orchestrator::new(ChoreoConfig::default(), p.scene.clone());
        orchestrator
            .set_decoration(decoration(&p, "top bottom"), &p.layout)
            .unwrap();

        // hero-about runs 0..800, about-services 1200..2000
        orchestrator.on_scroll(400.0, &p.layout);
        assert_eq!(orchestrator.decoration_owner(), Some("hero-about"));
        let x_mid = p.scene.lock().value(p.orb, Property::X).unwrap();
        assert!(close(x_mid, -450.0));

        orchestrator.on_scroll(1000.0, &p.layout);
        assert_eq!(orchestrator.decoration_owner(), None);
        let parked = p.scene.lock().value(p.orb, Property::Y).unwrap();
        assert!(close(parked, 900.0));

        orchestrator.on_scroll(1600.0, &p.layout);
        assert_eq!(orchestrator.decoration_owner(), Some("about-services"));

        // Jumping back lands on the same value as arriving in order
        orchestrator.on_scroll(400.0, &p.layout);
        assert!(close(p.scene.lock().value(p.orb, Property::X).unwrap(), x_mid));
    }

    #[test]
    fn sections_mounted_after_ready_are_armed() {
        let p = page();
        let mut orchestrator = Orchestrator::new(ChoreoConfig::default(), p.scene.clone());
        orchestrator.signal_ready(&p.layout);
        orchestrator.signal_ready(&p.layout);
        orchestrator.mount_section("about", &p.layout, reveal).unwrap();
        assert!(orchestrator.section("about").unwrap().is_ready());
        assert_eq!(orchestrator.active_listeners(), 1);
    }

    #[test]
    fn sections_mounted_after_ready_see_the_current_scroll() {
        let p = page();
        let mut orchestrator = Orchestrator::new(ChoreoConfig::default(), p.scene.clone());
        orchestrator.on_scroll(1000.0, &p.layout);
        orchestrator.signal_ready(&p.layout);
        // about "top 75%" starts at 200
        orchestrator.mount_section("about", &p.layout, reveal).unwrap();
        assert_eq!(orchestrator.scroll(), 1000.0);
        let binding = &orchestrator.section("about").unwrap().bindings()[0];
        assert_eq!(binding.state(), crate::trigger::BindingState::Active);
    }

    #[test]
    fn unmount_tears_down_before_removing_elements() {
        let p = page();
        let mut orchestrator = Orchestrator::new(ChoreoConfig::default(), p.scene.clone());
        orchestrator.mount_section("about", &p.layout, reveal).unwrap();
        let title = p.scene.lock().lookup("about-title").unwrap();
        assert_eq!(p.scene.lock().inline(title, Property::Opacity), Some(0.0));

        assert!(orchestrator.unmount_section("about"));
        assert!(!orchestrator.unmount_section("about"));
        let scene = p.scene.lock();
        assert!(!scene.is_mounted(title));
        assert!(scene.element(title).unwrap().inline_style().next().is_none());
    }

    #[test]
    fn teardown_restores_the_decoration() {
        let p = page();
        let mut orchestrator = Orchestrator::new(ChoreoConfig::default(), p.scene.clone());
        orchestrator
            .set_decoration(decoration(&p, "top bottom"), &p.layout)
            .unwrap();
        orchestrator.on_scroll(400.0, &p.layout);
        orchestrator.teardown();
        orchestrator.teardown();
        assert_eq!(p.scene.lock().inline(p.orb, Property::X), None);
        assert_eq!(orchestrator.section_names().count(), 0);
    }
}
