// SPDX-License-Identifier: MIT OR Apache-2.0
//! The studio home page: loading screen, sections and the travelling orb.

use crate::error::{AppError, Result};
use crate::layout::PageLayout;
use crate::loading::{self, ReadyLatch};
use crate::sections::{self, ServiceAccordion};
use choreo_sequencer::{
    ChoreoConfig, GlobalDecoration, Handoff, Orchestrator, Scene, ScrollLock, SharedScene, StaticLayout, TargetId,
    Viewport,
};
use std::cell::RefCell;
use std::rc::Rc;

/// A fully composed page
pub struct Page {
    scene: SharedScene,
    layout: PageLayout,
    measure: StaticLayout,
    orchestrator: Orchestrator,
    scroll_lock: Rc<RefCell<ScrollLock>>,
    ready: ReadyLatch,
    accordion: Option<ServiceAccordion>,
    loading_log: Vec<String>,
}

impl Page {
    /// Lay out the page, mount the loading screen and every section, and
    /// install the decoration handoffs
    pub fn build(viewport: Viewport, config: ChoreoConfig) -> Result<Self> {
        let layout = PageLayout::new(viewport);
        let mut scene = Scene::new();
        let measure = layout.build(&mut scene);
        let scene = scene.shared();

        let mut orchestrator = Orchestrator::new(config, scene.clone());
        let scroll_lock = Rc::new(RefCell::new(ScrollLock::new()));
        let ready = ReadyLatch::new();
        loading::mount(&mut orchestrator, &measure, scroll_lock.clone(), ready.clone())?;

        orchestrator.mount_section("hero", &measure, sections::hero)?;
        orchestrator.mount_section("about", &measure, sections::about)?;
        let mut accordion = None;
        orchestrator.mount_section("services", &measure, |scope| {
            accordion = Some(sections::services(scope)?);
            Ok(())
        })?;
        orchestrator.mount_section("projects", &measure, sections::projects)?;
        orchestrator.mount_section("experience", &measure, sections::experience)?;
        orchestrator.mount_section("footer", &measure, sections::footer)?;

        let decoration = {
            let scene = scene.lock();
            let id = |name: &str| -> Result<TargetId> {
                scene
                    .lookup(name)
                    .ok_or_else(|| AppError::MissingElement(name.to_string()))
            };
            GlobalDecoration::new(id("orb")?)
                .with_handoff(Handoff::new(
                    "hero-about",
                    id("about")?,
                    "top bottom",
                    "top top",
                    id("hero-slot")?,
                    id("about-slot")?,
                )?)
                .with_handoff(Handoff::new(
                    "about-services",
                    id("services")?,
                    "top bottom",
                    "top top",
                    id("about-slot")?,
                    id("services-slot")?,
                )?)
        };
        orchestrator.set_decoration(decoration, &measure)?;

        tracing::info!(
            sections = orchestrator.section_names().count(),
            height = layout.document_height(),
            "page built"
        );

        Ok(Self {
            scene,
            layout,
            measure,
            orchestrator,
            scroll_lock,
            ready,
            accordion,
            loading_log: Vec::new(),
        })
    }

    /// Shared scene
    pub fn scene(&self) -> &SharedScene {
        &self.scene
    }

    /// Page geometry
    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    /// The orchestrator
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Whether document scrolling is locked
    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_lock.borrow().is_locked()
    }

    /// Scroll lock, shared with the loading screen
    pub fn scroll_lock(&self) -> Rc<RefCell<ScrollLock>> {
        self.scroll_lock.clone()
    }

    /// Whether the sections were told content is ready
    pub fn is_ready(&self) -> bool {
        self.orchestrator.is_ready()
    }

    /// Loading steps in the order they completed
    pub fn loading_log(&self) -> &[String] {
        &self.loading_log
    }

    /// Open service panel
    pub fn active_service(&self) -> Option<usize> {
        self.accordion.as_ref().map(ServiceAccordion::active)
    }

    /// Hand over from the loading screen once it has finished. Returns
    /// true on the call that signalled ready.
    pub fn poll_ready(&mut self) -> bool {
        if !self.ready.is_ready() || self.orchestrator.is_ready() {
            return false;
        }
        if let Some(loading) = self.orchestrator.section(loading::SECTION) {
            self.loading_log = loading.completion_log().to_vec();
        }
        self.orchestrator.signal_ready(&self.measure);
        self.orchestrator.unmount_section(loading::SECTION);
        true
    }

    /// Open a service panel
    pub fn select_service(&mut self, index: usize) -> bool {
        let (Some(accordion), Some(sequencer)) = (self.accordion.as_mut(), self.orchestrator.section_mut("services"))
        else {
            return false;
        };
        accordion.select(index, sequencer)
    }

    /// Feed a scroll offset to the page
    pub fn on_scroll(&mut self, scroll: f32) {
        self.orchestrator.on_scroll(scroll, &self.measure);
    }

    /// Advance the frame clock
    pub fn tick(&mut self, dt: f32) {
        self.orchestrator.tick(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use choreo_sequencer::Property;

    fn run(page: &mut Page, seconds: f32) {
        for _ in 0..(seconds * 60.0) as usize {
            page.tick(1.0 / 60.0);
            page.poll_ready();
        }
    }

    fn value(page: &Page, name: &str, property: Property) -> Option<f32> {
        let scene = page.scene().lock();
        scene.lookup(name).and_then(|id| scene.value(id, property))
    }

    #[test]
    fn page_waits_for_loading() {
        let mut page = Page::build(Viewport::default(), ChoreoConfig::default()).unwrap();
        assert!(page.is_scroll_locked());
        assert!(!page.poll_ready());

        run(&mut page, 2.0);
        assert!(!page.is_ready());
        assert_eq!(value(&page, "hero-subtitle", Property::Opacity), Some(0.0));

        run(&mut page, 3.0);
        assert!(page.is_ready());
        assert!(!page.is_scroll_locked());
        assert_eq!(page.loading_log().len(), 5);
        assert!(value(&page, "loading-screen", Property::Opacity).is_none());
        assert!(!page.poll_ready());

        run(&mut page, 3.0);
        assert_eq!(value(&page, "hero-subtitle", Property::Opacity), Some(1.0));
    }

    #[test]
    fn orb_travels_between_slots() {
        let mut page = Page::build(Viewport::new(1440.0, 900.0), ChoreoConfig::default()).unwrap();
        // hero-about spans 0..900, about-services spans 1350..2250
        page.on_scroll(450.0);
        assert_eq!(page.orchestrator().decoration_owner(), Some("hero-about"));
        page.on_scroll(1000.0);
        assert_eq!(page.orchestrator().decoration_owner(), None);
        page.on_scroll(1800.0);
        assert_eq!(page.orchestrator().decoration_owner(), Some("about-services"));

        page.on_scroll(0.0);
        assert_eq!(value(&page, "orb", Property::X), Some(0.0));
        assert_eq!(value(&page, "orb", Property::Y), Some(0.0));
    }

    #[test]
    fn service_selection_needs_a_new_panel() {
        let mut page = Page::build(Viewport::default(), ChoreoConfig::default()).unwrap();
        assert_eq!(page.active_service(), Some(0));
        assert!(!page.select_service(0));
        assert!(page.select_service(3));
        assert_eq!(page.active_service(), Some(3));
    }
}
