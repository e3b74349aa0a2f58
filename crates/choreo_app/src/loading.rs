// SPDX-License-Identifier: MIT OR Apache-2.0
//! Loading screen.
//!
//! Runs on the frame clock as soon as it is mounted, with document scroll
//! locked. When the last step finishes the lock is released and the page
//! is told its content is ready.

use choreo_sequencer::{
    Ease, Measure, Orchestrator, Position, Property, PropertyMap, Result, ScrollLock, Step, Track,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Section name the loading screen is mounted under
pub const SECTION: &str = "loading";

/// Counts "content ready" signals
#[derive(Debug, Clone, Default)]
pub struct ReadyLatch(Rc<Cell<u32>>);

impl ReadyLatch {
    /// Create an unfired latch
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal readiness
    pub fn fire(&self) {
        self.0.set(self.0.get() + 1);
    }

    /// How many times the latch fired
    pub fn count(&self) -> u32 {
        self.0.get()
    }

    /// Whether the latch fired at least once
    pub fn is_ready(&self) -> bool {
        self.count() > 0
    }
}

/// Mount the loading screen
pub fn mount(
    orchestrator: &mut Orchestrator,
    measure: &dyn Measure,
    lock: Rc<RefCell<ScrollLock>>,
    ready: ReadyLatch,
) -> Result<()> {
    orchestrator.mount_section(SECTION, measure, move |scope| {
        let screen = scope.element("loading-screen");
        let grid = scope.element("loading-grid");
        let logo = scope.element("loading-logo");
        let title = scope.element("loading-title");

        lock.borrow_mut().lock();

        scope.set(screen, &PropertyMap::new().with(Property::Opacity, 1.0));
        scope.set(grid, &PropertyMap::new().with(Property::Opacity, 0.0));
        scope.set(
            title,
            &PropertyMap::new().with(Property::Opacity, 0.0).with(Property::Y, 20.0),
        );

        let track = Track::new("loading")
            .then(
                Step::to(vec![grid], PropertyMap::new().with(Property::Opacity, 1.0))
                    .duration(1.0)
                    .delay(0.3)
                    .ease(Ease::out(3))
                    .label("grid-fade"),
            )
            .then(
                Step::from_to(
                    vec![logo],
                    PropertyMap::new().with(Property::Opacity, 0.0).with(Property::Scale, 0.95),
                    PropertyMap::new().with(Property::Opacity, 1.0).with(Property::Scale, 1.0),
                )
                .duration(1.0)
                .delay(0.3)
                .ease(Ease::out(3))
                .at(Position::WithPrevious)
                .label("logo-scale"),
            )
            .then(
                Step::to(
                    vec![title],
                    PropertyMap::new().with(Property::Opacity, 1.0).with(Property::Y, 0.0),
                )
                .duration(0.8)
                .ease(Ease::out(2))
                .at(Position::Offset(-0.4))
                .label("title-reveal"),
            )
            .then(Step::hold(2.0).label("hold"))
            .then(
                Step::to(vec![screen], PropertyMap::new().with(Property::Opacity, 0.0))
                    .duration(0.8)
                    .ease(Ease::in_out(2))
                    .label("fade-out"),
            );

        let release = lock.clone();
        scope.play_now(track, move || {
            if release.borrow_mut().release() {
                tracing::info!("loading complete, scroll released");
            }
            ready.fire();
        });

        scope.on_teardown(move |_| {
            lock.borrow_mut().release();
        });
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PageLayout;
    use choreo_sequencer::{ChoreoConfig, Scene, Viewport};

    const FRAME: f32 = 1.0 / 60.0;

    fn run_for(orchestrator: &mut Orchestrator, seconds: f32) {
        let frames = (seconds / FRAME).round() as usize;
        for _ in 0..frames {
            orchestrator.tick(FRAME);
        }
    }

    #[test]
    fn loading_fires_ready_once_in_order() {
        let mut scene = Scene::new();
        let layout = PageLayout::new(Viewport::default()).build(&mut scene);
        let mut orchestrator = Orchestrator::new(ChoreoConfig::default(), scene.shared());
        let lock = Rc::new(RefCell::new(ScrollLock::new()));
        let latch = ReadyLatch::new();

        mount(&mut orchestrator, &layout, lock.clone(), latch.clone()).unwrap();
        assert!(lock.borrow().is_locked());

        run_for(&mut orchestrator, 4.3);
        assert!(!latch.is_ready());
        assert!(lock.borrow().is_locked());

        run_for(&mut orchestrator, 1.0);
        assert_eq!(latch.count(), 1);
        assert!(!lock.borrow().is_locked());

        let log = orchestrator.section(SECTION).unwrap().completion_log().to_vec();
        assert_eq!(log, vec!["grid-fade", "logo-scale", "title-reveal", "hold", "fade-out"]);

        run_for(&mut orchestrator, 1.0);
        assert!(orchestrator.unmount_section(SECTION));
        assert_eq!(latch.count(), 1);
        assert_eq!(lock.borrow().release_count(), 1);
    }

    #[test]
    fn unmounting_early_releases_the_lock() {
        let mut scene = Scene::new();
        let layout = PageLayout::new(Viewport::default()).build(&mut scene);
        let shared = scene.shared();
        let mut orchestrator = Orchestrator::new(ChoreoConfig::default(), shared.clone());
        let lock = Rc::new(RefCell::new(ScrollLock::new()));
        let latch = ReadyLatch::new();

        mount(&mut orchestrator, &layout, lock.clone(), latch.clone()).unwrap();
        run_for(&mut orchestrator, 1.0);
        orchestrator.unmount_section(SECTION);
        run_for(&mut orchestrator, 5.0);

        assert!(!latch.is_ready());
        assert_eq!(lock.borrow().release_count(), 1);
        assert!(shared.lock().lookup("loading-screen").is_none());
    }

    #[test]
    fn reduced_motion_is_ready_at_once() {
        let mut scene = Scene::new();
        let layout = PageLayout::new(Viewport::default()).build(&mut scene);
        let config = ChoreoConfig {
            reduced_motion: true,
            ..ChoreoConfig::default()
        };
        let mut orchestrator = Orchestrator::new(config, scene.shared());
        let lock = Rc::new(RefCell::new(ScrollLock::new()));
        let latch = ReadyLatch::new();

        mount(&mut orchestrator, &layout, lock.clone(), latch.clone()).unwrap();
        assert_eq!(latch.count(), 1);
        assert!(!lock.borrow().is_locked());
    }
}
