// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless frame loop.
//!
//! Plays a scripted visit: wait for the loading screen, pause, then scroll
//! down at a steady wheel speed while cycling through the service panels.
//! Every frame produces a [`FrameSnapshot`] of the visible state.

use crate::error::Result;
use crate::layout::SERVICE_PANELS;
use crate::page::Page;
use crate::settings::AppSettings;
use choreo_sequencer::SmoothScroll;
use indexmap::IndexMap;
use serde::Serialize;

/// Visible state after one frame
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    /// Frame number, from 1
    pub frame: u64,
    /// Seconds since the page was built
    pub time: f32,
    /// Scroll offset used for the frame
    pub scroll: f32,
    /// Whether document scrolling was locked
    pub locked: bool,
    /// Whether content was ready
    pub ready: bool,
    /// Handoff moving the decoration, if any
    pub decoration_owner: Option<String>,
    /// Open service panel
    pub active_service: Option<usize>,
    /// Attached scroll listeners
    pub listeners: usize,
    /// Inline styles per element
    pub styles: IndexMap<String, IndexMap<&'static str, f32>>,
}

/// End-of-run report
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Frames played
    pub frames: u64,
    /// Simulated seconds
    pub duration: f32,
    /// Scroll offset after the last frame
    pub final_scroll: f32,
    /// When content became ready
    pub ready_at: Option<f32>,
    /// Loading steps in completion order
    pub loading_steps: Vec<String>,
    /// Times the decoration changed owner
    pub ownership_changes: usize,
    /// Service panels opened by the visitor
    pub services_selected: usize,
    /// Scroll listeners still attached
    pub listeners: usize,
}

/// Page plus a simulated visitor
pub struct Simulation {
    settings: AppSettings,
    page: Page,
    scroll: SmoothScroll,
    frame: u64,
    time: f32,
    ready_at: Option<f32>,
    next_selection: f32,
    selections: usize,
    owner: Option<String>,
    ownership_changes: usize,
}

impl Simulation {
    /// Build the page described by `settings`
    pub fn new(settings: AppSettings) -> Result<Self> {
        let page = Page::build(settings.viewport.into(), settings.choreo.clone())?;
        let scroll = SmoothScroll::new(settings.choreo.smooth_scroll, page.layout().scroll_limit());
        Ok(Self {
            settings,
            page,
            scroll,
            frame: 0,
            time: 0.0,
            ready_at: None,
            next_selection: f32::INFINITY,
            selections: 0,
            owner: None,
            ownership_changes: 0,
        })
    }

    /// Play one frame
    pub fn step(&mut self) -> FrameSnapshot {
        let dt = self.settings.frame_time();
        self.frame += 1;
        self.time += dt;

        let scrolling = self
            .ready_at
            .is_some_and(|at| self.time - at >= self.settings.run.pause_before_scroll);
        if scrolling {
            let lock = self.page.scroll_lock();
            self.scroll.scroll_by(self.settings.run.wheel_speed * dt, &lock.borrow());
        }
        let offset = self.scroll.tick();

        self.page.on_scroll(offset);
        self.page.tick(dt);
        if self.page.poll_ready() {
            tracing::info!(time = self.time, "content ready");
            self.ready_at = Some(self.time);
            self.next_selection = self.time + self.settings.run.accordion_interval.max(f32::EPSILON);
        }

        if self.time >= self.next_selection {
            let next = self.page.active_service().map_or(0, |i| (i + 1) % SERVICE_PANELS);
            if self.page.select_service(next) {
                self.selections += 1;
            }
            self.next_selection += self.settings.run.accordion_interval.max(f32::EPSILON);
        }

        let owner = self.page.orchestrator().decoration_owner().map(str::to_string);
        if owner != self.owner {
            self.ownership_changes += 1;
            self.owner = owner;
        }

        self.snapshot(offset)
    }

    /// Play `frames` frames, handing each snapshot to `sink`
    pub fn run<F>(&mut self, frames: u64, mut sink: F) -> Result<RunSummary>
    where
        F: FnMut(&FrameSnapshot) -> Result<()>,
    {
        for _ in 0..frames {
            let snapshot = self.step();
            sink(&snapshot)?;
        }
        Ok(self.summary())
    }

    /// Report on the frames played so far
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            frames: self.frame,
            duration: self.time,
            final_scroll: self.scroll.current(),
            ready_at: self.ready_at,
            loading_steps: self.page.loading_log().to_vec(),
            ownership_changes: self.ownership_changes,
            services_selected: self.selections,
            listeners: self.page.orchestrator().active_listeners(),
        }
    }

    fn snapshot(&self, scroll: f32) -> FrameSnapshot {
        let styles = {
            let scene = self.page.scene().lock();
            scene
                .iter()
                .filter_map(|(_, element)| {
                    let style: IndexMap<&'static str, f32> =
                        element.inline_style().map(|(p, v)| (p.name(), v)).collect();
                    (!style.is_empty()).then(|| (element.name.clone(), style))
                })
                .collect()
        };

        FrameSnapshot {
            frame: self.frame,
            time: self.time,
            scroll,
            locked: self.page.is_scroll_locked(),
            ready: self.page.is_ready(),
            decoration_owner: self.owner.clone(),
            active_service: self.page.active_service(),
            listeners: self.page.orchestrator().active_listeners(),
            styles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::RunSettings;

    fn settings(duration: f32) -> AppSettings {
        AppSettings {
            run: RunSettings {
                duration,
                ..RunSettings::default()
            },
            ..AppSettings::default()
        }
    }

    #[test]
    fn scroll_stays_locked_while_loading() {
        let mut simulation = Simulation::new(settings(4.0)).unwrap();
        let mut frames = Vec::new();
        simulation
            .run(240, |snapshot| {
                frames.push((snapshot.locked, snapshot.scroll, snapshot.ready));
                Ok(())
            })
            .unwrap();
        assert!(frames.iter().all(|&(locked, scroll, ready)| locked && scroll == 0.0 && !ready));
    }

    #[test]
    fn full_visit_scrolls_and_hands_off() {
        let settings = settings(12.0);
        let frames = settings.frame_count();
        let mut simulation = Simulation::new(settings).unwrap();
        let mut last = None;
        let summary = simulation
            .run(frames, |snapshot| {
                last = Some(snapshot.clone());
                Ok(())
            })
            .unwrap();

        let ready_at = summary.ready_at.unwrap();
        assert!(ready_at >= 4.5 && ready_at < 4.6);
        assert_eq!(
            summary.loading_steps,
            vec!["grid-fade", "logo-scale", "title-reveal", "hold", "fade-out"]
        );
        assert!(summary.final_scroll > 2250.0);
        // Two handoffs entered and left
        assert!(summary.ownership_changes >= 4);
        assert!(summary.services_selected >= 2);

        let last = last.unwrap();
        assert!(!last.locked);
        assert!(!last.styles.contains_key("loading-screen"));
        assert!(last.styles.contains_key("orb"));
        assert_eq!(last.frame, frames);
    }

    #[test]
    fn snapshots_serialize_as_json() {
        let mut simulation = Simulation::new(settings(1.0)).unwrap();
        let snapshot = simulation.step();
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["frame"], 1);
        assert_eq!(json["styles"]["loading-screen"]["opacity"], 1.0);
    }
}
