// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequencers: lifecycle owners for one view's animations.
//!
//! Everything created inside [`Sequencer::create`]'s setup closure (trigger
//! bindings, free-running tracks, pinned stages, owned elements, cleanup
//! hooks) is collected by the sequencer and released together by
//! [`Sequencer::teardown`].

use crate::config::ChoreoConfig;
use crate::error::Result;
use crate::journal::StyleJournal;
use crate::measure::{Measure, Viewport};
use crate::pinned::PinnedStage;
use crate::player::TrackPlayer;
use crate::property::PropertyMap;
use crate::scene::{Scene, SharedScene, TargetId};
use crate::track::Track;
use crate::trigger::{Activation, BindingId, TriggerBinding};
use std::fmt;

/// Runs once when a track completes, after the scene lock is released
pub type CompletionCallback = Box<dyn FnOnce()>;

/// Runs once during teardown, after inline styles are restored
pub type TeardownHook = Box<dyn FnOnce(&mut Scene)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayState {
    WaitingForReady,
    Playing,
    Finished,
}

/// A track on the frame clock, not bound to scroll
struct FreePlayer {
    player: TrackPlayer,
    state: PlayState,
    on_complete: Option<CompletionCallback>,
    logged: usize,
}

impl FreePlayer {
    fn new(player: TrackPlayer, state: PlayState, on_complete: Option<CompletionCallback>) -> Self {
        Self {
            player,
            state,
            on_complete,
            logged: 0,
        }
    }
}

/// Collects everything a section builds during setup
pub struct SequencerScope<'a> {
    scene: &'a mut Scene,
    journal: &'a mut StyleJournal,
    config: &'a ChoreoConfig,
    viewport: Viewport,
    bindings: Vec<TriggerBinding>,
    players: Vec<FreePlayer>,
    stages: Vec<PinnedStage>,
    owned: Vec<TargetId>,
    hooks: Vec<TeardownHook>,
}

impl<'a> SequencerScope<'a> {
    /// Register an element owned by this sequencer
    pub fn element(&mut self, name: &str) -> TargetId {
        let id = self.scene.insert(name);
        if !self.owned.contains(&id) {
            self.owned.push(id);
        }
        id
    }

    /// Register a numbered group of owned elements (`prefix-0`, `prefix-1`, ...)
    pub fn elements(&mut self, prefix: &str, count: usize) -> Vec<TargetId> {
        (0..count).map(|i| self.element(&format!("{prefix}-{i}"))).collect()
    }

    /// Look up an existing element, owned or not
    pub fn target(&self, name: &str) -> Option<TargetId> {
        self.scene.lookup(name)
    }

    /// Configuration the sequencer was created with
    pub fn config(&self) -> &ChoreoConfig {
        self.config
    }

    /// Viewport at setup time
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Set inline values immediately; restored on teardown
    pub fn set(&mut self, target: TargetId, properties: &PropertyMap) {
        for (property, value) in properties.iter() {
            self.journal.write(self.scene, target, property, value);
        }
    }

    /// Play `track` once when `trigger` crosses `start`
    pub fn once(&mut self, trigger: TargetId, start: &str, track: Track) -> Result<BindingId> {
        let activation = Activation::OneShot { start: start.parse()? };
        Ok(self.bind(trigger, activation, track))
    }

    /// Scrub `track` with scroll between `start` and `end`
    pub fn scrub(&mut self, trigger: TargetId, start: &str, end: &str, track: Track) -> Result<BindingId> {
        let activation = Activation::Scrubbed {
            start: start.parse()?,
            end: end.parse()?,
        };
        Ok(self.bind(trigger, activation, track))
    }

    /// Play `track` on the frame clock once content is ready
    pub fn play(&mut self, track: Track) {
        let player = TrackPlayer::new(track, self.scene, self.journal);
        self.players.push(FreePlayer::new(player, PlayState::WaitingForReady, None));
    }

    /// Play `track` immediately, without waiting for content
    pub fn play_now(&mut self, track: Track, on_complete: impl FnOnce() + 'static) {
        let player = TrackPlayer::new(track, self.scene, self.journal);
        self.players
            .push(FreePlayer::new(player, PlayState::Playing, Some(Box::new(on_complete))));
    }

    /// Add a pinned stage, posed at its start
    pub fn pin(&mut self, stage: PinnedStage) {
        let mut stage = stage.with_connector_config(self.config.connector);
        stage.prepare(self.viewport, self.scene, self.journal);
        self.stages.push(stage);
    }

    /// Run `hook` on teardown
    pub fn on_teardown(&mut self, hook: impl FnOnce(&mut Scene) + 'static) {
        self.hooks.push(Box::new(hook));
    }

    fn bind(&mut self, trigger: TargetId, activation: Activation, track: Track) -> BindingId {
        let player = TrackPlayer::new(track, self.scene, self.journal);
        let binding = TriggerBinding::new(trigger, activation, player);
        let id = binding.id();
        self.bindings.push(binding);
        id
    }
}

/// Owns a view's animations from mount to teardown
pub struct Sequencer {
    name: String,
    scene: SharedScene,
    config: ChoreoConfig,
    journal: StyleJournal,
    bindings: Vec<TriggerBinding>,
    players: Vec<FreePlayer>,
    stages: Vec<PinnedStage>,
    owned: Vec<TargetId>,
    hooks: Vec<TeardownHook>,
    completion_log: Vec<String>,
    ready: bool,
    torn_down: bool,
}

impl Sequencer {
    /// Build a sequencer by running `setup` against the scene.
    ///
    /// If `setup` fails, everything it already changed is reverted.
    pub fn create<F>(
        name: impl Into<String>,
        scene: SharedScene,
        config: ChoreoConfig,
        measure: &dyn Measure,
        setup: F,
    ) -> Result<Self>
    where
        F: FnOnce(&mut SequencerScope<'_>) -> Result<()>,
    {
        let name = name.into();
        let mut journal = StyleJournal::new();
        let shared = scene.clone();
        let mut guard = shared.lock();

        let mut scope = SequencerScope {
            scene: &mut guard,
            journal: &mut journal,
            config: &config,
            viewport: measure.viewport(),
            bindings: Vec::new(),
            players: Vec::new(),
            stages: Vec::new(),
            owned: Vec::new(),
            hooks: Vec::new(),
        };

        if let Err(err) = setup(&mut scope) {
            drop(scope);
            journal.revert(&mut guard);
            tracing::warn!(sequencer = %name, error = %err, "setup failed");
            return Err(err);
        }

        let SequencerScope {
            bindings,
            players,
            stages,
            owned,
            hooks,
            ..
        } = scope;
        drop(guard);

        tracing::debug!(
            sequencer = %name,
            bindings = bindings.len(),
            players = players.len(),
            stages = stages.len(),
            "sequencer created"
        );

        let mut sequencer = Self {
            name,
            scene,
            config,
            journal,
            bindings,
            players,
            stages,
            owned,
            hooks,
            completion_log: Vec::new(),
            ready: false,
            torn_down: false,
        };
        if sequencer.config.reduced_motion {
            sequencer.tick(0.0);
        }
        Ok(sequencer)
    }

    /// Sequencer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether content-ready was received
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Elements registered through [`SequencerScope::element`]
    pub fn owned_elements(&self) -> &[TargetId] {
        &self.owned
    }

    /// Trigger bindings
    pub fn bindings(&self) -> &[TriggerBinding] {
        &self.bindings
    }

    /// Pinned stages
    pub fn stages(&self) -> &[PinnedStage] {
        &self.stages
    }

    /// Labels of completed free-running steps, in completion order
    pub fn completion_log(&self) -> &[String] {
        &self.completion_log
    }

    /// Number of attached scroll listeners
    pub fn active_listeners(&self) -> usize {
        self.bindings.iter().filter(|b| b.is_listening()).count()
            + self.stages.iter().filter(|s| s.is_listening()).count()
    }

    /// Content is ready at scroll offset `scroll`: arm bindings and stages,
    /// evaluate them against `scroll`, start waiting tracks
    pub fn on_ready(&mut self, scroll: f32, measure: &dyn Measure) {
        if self.torn_down || self.ready {
            return;
        }
        self.ready = true;

        for binding in &mut self.bindings {
            binding.arm();
        }
        for stage in &mut self.stages {
            stage.arm();
        }
        let reduced = self.config.reduced_motion;
        for free in &mut self.players {
            if free.state != PlayState::WaitingForReady {
                continue;
            }
            // Endless loops stay parked under reduced motion
            free.state = if reduced && !free.player.duration().is_finite() {
                PlayState::Finished
            } else {
                PlayState::Playing
            };
        }
        tracing::debug!(sequencer = %self.name, scroll, "ready");

        // A section already in view must not wait for the next scroll event
        self.on_scroll(scroll, measure);

        if reduced {
            self.tick(0.0);
        }
    }

    /// Feed a scroll position to every binding and stage
    pub fn on_scroll(&mut self, scroll: f32, measure: &dyn Measure) {
        if self.torn_down {
            return;
        }
        let scene = self.scene.clone();
        let mut guard = scene.lock();
        for binding in &mut self.bindings {
            binding.on_scroll(scroll, measure, &mut guard, &mut self.journal);
        }
        for stage in &mut self.stages {
            stage.on_scroll(scroll, measure, &mut guard, &mut self.journal);
        }
    }

    /// Advance time-driven tracks by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if self.torn_down {
            return;
        }
        let dt = if self.config.reduced_motion { f32::INFINITY } else { dt };

        let scene = self.scene.clone();
        let mut guard = scene.lock();
        for binding in &mut self.bindings {
            binding.tick(dt, &mut guard, &mut self.journal);
        }
        let callbacks = advance_players(
            &self.name,
            &mut self.players,
            &mut self.completion_log,
            &mut guard,
            &mut self.journal,
            dt,
        );
        drop(guard);

        for callback in callbacks {
            callback();
        }
    }

    /// Start a track after setup; it waits for ready if needed
    pub fn play(&mut self, track: Track) {
        if self.torn_down {
            return;
        }
        let scene = self.scene.clone();
        let mut guard = scene.lock();
        let player = TrackPlayer::new(track, &mut guard, &mut self.journal);
        drop(guard);

        let state = if self.ready { PlayState::Playing } else { PlayState::WaitingForReady };
        self.players.retain(|free| free.state != PlayState::Finished);
        self.players.push(FreePlayer::new(player, state, None));

        if self.ready && self.config.reduced_motion {
            self.tick(0.0);
        }
    }

    /// Cancel everything and restore inline styles. Idempotent.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        for binding in &mut self.bindings {
            binding.detach();
        }
        for stage in &mut self.stages {
            stage.detach();
        }
        // In-flight tracks are cancelled, their callbacks never run
        self.players.clear();

        let scene = self.scene.clone();
        let mut guard = scene.lock();
        self.journal.revert(&mut guard);
        for hook in self.hooks.drain(..) {
            hook(&mut guard);
        }
        tracing::debug!(sequencer = %self.name, "torn down");
    }
}

impl Drop for Sequencer {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequencer")
            .field("name", &self.name)
            .field("bindings", &self.bindings.len())
            .field("players", &self.players.len())
            .field("stages", &self.stages.len())
            .field("ready", &self.ready)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

fn advance_players(
    sequencer: &str,
    players: &mut [FreePlayer],
    log: &mut Vec<String>,
    scene: &mut Scene,
    journal: &mut StyleJournal,
    dt: f32,
) -> Vec<CompletionCallback> {
    let mut callbacks = Vec::new();

    for free in players.iter_mut().filter(|p| p.state == PlayState::Playing) {
        free.player.advance(dt, scene, journal);

        let labels = free.player.completed_labels();
        log.extend(labels[free.logged..].iter().map(|l| l.to_string()));
        free.logged = labels.len();

        if free.player.is_complete() {
            free.state = PlayState::Finished;
            tracing::debug!(sequencer, track = %free.player.track().name, "track complete");
            if let Some(callback) = free.on_complete.take() {
                callbacks.push(callback);
            }
        }
    }

    callbacks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::StaticLayout;
    use crate::property::Property;
    use crate::step::Step;
    use egui::{Pos2, Vec2};
    use std::cell::Cell;
    use std::rc::Rc;

    struct Page {
        scene: SharedScene,
        layout: StaticLayout,
    }

    fn page() -> Page {
        let mut scene = Scene::new();
        let section = scene.insert("about");
        let title = scene.insert("about-title");
        let image = scene.insert("about-image");
        let layout = StaticLayout::new(Viewport::new(1200.0, 800.0))
            .with_box(section, Pos2::new(0.0, 800.0), Vec2::new(1200.0, 1200.0))
            .with_box(title, Pos2::new(0.0, 900.0), Vec2::new(600.0, 100.0))
            .with_box(image, Pos2::new(600.0, 900.0), Vec2::new(600.0, 600.0));
        Page {
            scene: scene.shared(),
            layout,
        }
    }

    fn about(scope: &mut SequencerScope<'_>) -> Result<()> {
        let section = scope.element("about");
        let title = scope.element("about-title");
        let image = scope.element("about-image");

        let reveal = Track::new("about-reveal")
            .then(Step::from(vec![title], PropertyMap::new().with(Property::Opacity, 0.0)).duration(1.0));
        let start = scope.config().reveal_start.clone();
        scope.once(section, &start, reveal)?;

        let parallax = Track::new("about-parallax").then(
            Step::to(vec![image], PropertyMap::new().with(Property::YPercent, -20.0))
                .ease(crate::ease::Ease::Linear)
                .duration(1.0),
        );
        scope.scrub(section, "top bottom", "bottom top", parallax)?;
        Ok(())
    }

    fn snapshot(scene: &SharedScene) -> Vec<(String, Vec<(Property, f32)>)> {
        let scene = scene.lock();
        ["about-title", "about-image"]
            .iter()
            .filter_map(|name| {
                let id = scene.lookup(name)?;
                let style = scene.element(id)?.inline_style().collect();
                Some((name.to_string(), style))
            })
            .collect()
    }

    #[test]
    fn teardown_twice_leaves_nothing_listening() {
        let p = page();
        let before = snapshot(&p.scene);
        let mut seq = Sequencer::create("about", p.scene.clone(), ChoreoConfig::default(), &p.layout, about).unwrap();
        seq.on_ready(0.0, &p.layout);
        assert_eq!(seq.active_listeners(), 2);

        seq.on_scroll(1000.0, &p.layout);
        seq.tick(0.5);
        assert_ne!(snapshot(&p.scene), before);

        seq.teardown();
        seq.teardown();
        assert_eq!(seq.active_listeners(), 0);
        assert_eq!(snapshot(&p.scene), before);

        seq.on_scroll(1400.0, &p.layout);
        seq.tick(1.0);
        assert_eq!(snapshot(&p.scene), before);
    }

    #[test]
    fn teardown_cancels_in_flight_animation() {
        let p = page();
        let mut seq = Sequencer::create("about", p.scene.clone(), ChoreoConfig::default(), &p.layout, about).unwrap();
        seq.on_ready(0.0, &p.layout);
        seq.on_scroll(1000.0, &p.layout);
        seq.tick(0.3);
        let title = p.scene.lock().lookup("about-title").unwrap();
        let mid = p.scene.lock().value(title, Property::Opacity).unwrap();
        assert!(mid > 0.0 && mid < 1.0);

        drop(seq);
        assert_eq!(p.scene.lock().inline(title, Property::Opacity), None);
    }

    #[test]
    fn ready_evaluates_the_current_scroll() {
        let p = page();
        let mut seq = Sequencer::create("about", p.scene.clone(), ChoreoConfig::default(), &p.layout, about).unwrap();
        // Already past the 200px reveal threshold and halfway through the parallax
        seq.on_ready(1000.0, &p.layout);
        assert_eq!(seq.active_listeners(), 2);
        assert_eq!(seq.bindings()[1].progress(), Some(0.5));

        seq.tick(1.0);
        let scene = p.scene.lock();
        let title = scene.lookup("about-title").unwrap();
        let image = scene.lookup("about-image").unwrap();
        assert_eq!(scene.value(title, Property::Opacity), Some(1.0));
        assert_eq!(scene.value(image, Property::YPercent), Some(-10.0));
    }

    #[test]
    fn play_waits_for_ready_and_play_now_does_not() {
        let p = page();
        let done = Rc::new(Cell::new(0));
        let done_in_callback = done.clone();
        let scene_in_callback = p.scene.clone();

        let mut seq = Sequencer::create("intro", p.scene.clone(), ChoreoConfig::default(), &p.layout, |scope| {
            let title = scope.element("about-title");
            let image = scope.element("about-image");
            scope.play(Track::new("later").then(Step::to(vec![image], PropertyMap::new().with(Property::X, 10.0))));
            scope.play_now(
                Track::new("now").then(Step::to(vec![title], PropertyMap::new().with(Property::X, 10.0)).duration(1.0)),
                move || {
                    // The scene is unlocked while callbacks run
                    let mut scene = scene_in_callback.lock();
                    let image = scene.lookup("about-image").unwrap_or(TargetId(0));
                    scene.set(image, Property::Z, 1.0);
                    done_in_callback.set(done_in_callback.get() + 1);
                },
            );
            Ok(())
        })
        .unwrap();

        let image = p.scene.lock().lookup("about-image").unwrap();
        seq.tick(2.0);
        assert_eq!(done.get(), 1);
        assert_eq!(p.scene.lock().value(image, Property::X), Some(0.0));

        seq.on_ready(0.0, &p.layout);
        seq.tick(1.0);
        seq.tick(1.0);
        assert_eq!(done.get(), 1);
        assert_eq!(p.scene.lock().value(image, Property::X), Some(10.0));
    }

    #[test]
    fn reduced_motion_jumps_to_the_end() {
        let p = page();
        let config = ChoreoConfig {
            reduced_motion: true,
            ..ChoreoConfig::default()
        };
        let mut seq = Sequencer::create("about", p.scene.clone(), config, &p.layout, |scope| {
            let title = scope.element("about-title");
            scope.play(Track::new("fade").then(
                Step::from(vec![title], PropertyMap::new().with(Property::Opacity, 0.0)).duration(5.0),
            ));
            Ok(())
        })
        .unwrap();
        let title = p.scene.lock().lookup("about-title").unwrap();
        assert_eq!(p.scene.lock().value(title, Property::Opacity), Some(0.0));
        seq.on_ready(0.0, &p.layout);
        assert_eq!(p.scene.lock().value(title, Property::Opacity), Some(1.0));
    }

    #[test]
    fn failed_setup_reverts_its_writes() {
        let p = page();
        let result = Sequencer::create("broken", p.scene.clone(), ChoreoConfig::default(), &p.layout, |scope| {
            let title = scope.element("about-title");
            scope.set(title, &PropertyMap::new().with(Property::Opacity, 0.0));
            scope.once(title, "somewhere", Track::new("never"))?;
            Ok(())
        });
        assert!(result.is_err());
        let scene = p.scene.lock();
        let title = scene.lookup("about-title").unwrap();
        assert_eq!(scene.inline(title, Property::Opacity), None);
    }

    #[test]
    fn teardown_hooks_run_once() {
        let p = page();
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let mut seq = Sequencer::create("hooks", p.scene.clone(), ChoreoConfig::default(), &p.layout, move |scope| {
            scope.on_teardown(move |_| counter.set(counter.get() + 1));
            Ok(())
        })
        .unwrap();
        seq.teardown();
        drop(seq);
        assert_eq!(runs.get(), 1);
    }
}
